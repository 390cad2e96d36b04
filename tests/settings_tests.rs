use std::io::Write;

use nodesub::settings::{init_settings, update_settings_from_content, Settings};

#[cfg(test)]
mod settings_tests {
    use super::*;

    // The settings snapshot is process-wide, so every step that replaces it
    // lives in this one test.
    #[test]
    fn test_settings_update_and_current() {
        let yaml_content = r#"
common:
  nodes_path: "/srv/nodesub/nodes.json"
  default_format: "surge"
  reload_nodes_on_request: false
server:
  listen: "0.0.0.0"
  port: 9090
        "#;
        update_settings_from_content(yaml_content).unwrap();

        let settings = Settings::current();
        assert_eq!(settings.listen_address, "0.0.0.0");
        assert_eq!(settings.listen_port, 9090);
        assert_eq!(settings.nodes_path, "/srv/nodesub/nodes.json");
        assert_eq!(settings.default_format, "surge");
        assert!(!settings.reload_nodes_on_request);

        let toml_content = r#"
[server]
listen = "127.0.0.1"
port = 8080

[advanced]
max_concur_threads = 8
        "#;
        update_settings_from_content(toml_content).unwrap();

        let updated = Settings::current();
        assert_eq!(updated.listen_address, "127.0.0.1");
        assert_eq!(updated.listen_port, 8080);
        assert_eq!(updated.max_concur_threads, 8);
        assert_eq!(updated.default_format, "clash");
        // the earlier snapshot is unaffected
        assert_eq!(settings.listen_port, 9090);

        assert!(update_settings_from_content("[server\nport = ").is_err());
        assert_eq!(Settings::current().listen_port, 8080);

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[common]\nnodes_path = \"fleet.json\"").unwrap();
        init_settings(file.path()).unwrap();

        let loaded = Settings::current();
        assert_eq!(loaded.nodes_path, "fleet.json");
        assert_eq!(loaded.pref_path, file.path().display().to_string());
        assert_eq!(loaded.listen_port, 25500);

        assert!(init_settings("/nonexistent/nodesub.toml").is_err());
    }

    #[test]
    fn test_yaml_without_optional_sections() {
        let settings = Settings::load_from_content("common:\n  default_format: v2ray\n").unwrap();
        assert_eq!(settings.default_format, "v2ray");
        assert_eq!(settings.listen_address, "127.0.0.1");
        assert_eq!(settings.max_concur_threads, 4);
    }
}
