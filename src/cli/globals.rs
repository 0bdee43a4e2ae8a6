use std::path::PathBuf;

/// Options shared by every subcommand: where the backend lives and where
/// client state is kept.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub state_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, state_dir: PathBuf) -> Self {
        Self { api_url, state_dir }
    }
}
