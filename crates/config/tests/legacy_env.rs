//! Conventional hosting variables layered over config files
//!
//! Kept to a single test: it mutates the process environment.

use std::io::Write;

use dog_assistant_config::load_settings_from;

#[test]
fn test_hosting_variables_override_config_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
    writeln!(
        file,
        r#"
[server]
port = 8000
cors_origins = ["http://localhost:3000"]
"#
    )
    .unwrap();

    std::env::remove_var("DOG_ASSISTANT__SERVER__PORT");
    std::env::remove_var("DOG_ASSISTANT__SERVER__CORS_ORIGINS");
    std::env::remove_var("DOG_ASSISTANT__LLM__API_KEY");
    std::env::set_var("PORT", "9321");
    std::env::set_var("ALLOWED_ORIGINS", "https://dogs.example,https://pups.example");
    std::env::set_var("OPENAI_API_KEY", "sk-from-env");

    let settings = load_settings_from(dir.path(), None).unwrap();
    assert_eq!(settings.server.port, 9321);
    assert_eq!(
        settings.server.cors_origins,
        vec!["https://dogs.example", "https://pups.example"]
    );
    assert_eq!(settings.llm.api_key.as_deref(), Some("sk-from-env"));

    // The prefixed variable keeps precedence
    std::env::set_var("DOG_ASSISTANT__SERVER__PORT", "7070");
    let settings = load_settings_from(dir.path(), None).unwrap();
    assert_eq!(settings.server.port, 7070);

    std::env::remove_var("DOG_ASSISTANT__SERVER__PORT");
    std::env::remove_var("PORT");
    std::env::remove_var("ALLOWED_ORIGINS");
    std::env::remove_var("OPENAI_API_KEY");
}
