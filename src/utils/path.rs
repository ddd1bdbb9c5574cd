use std::path::PathBuf;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "adapt-it", "AdaptSync")
}

/// Hämta databassökväg
pub fn get_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("adapt-sync.db"))
        .unwrap_or_else(|| PathBuf::from("adapt-sync.db"))
}

/// Hämta konfigurationssökväg
pub fn get_config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.toml"))
        .unwrap_or_else(|| PathBuf::from("settings.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_have_expected_file_names() {
        assert!(get_database_path().ends_with("adapt-sync.db"));
        assert!(get_config_path().ends_with("settings.toml"));
    }
}
