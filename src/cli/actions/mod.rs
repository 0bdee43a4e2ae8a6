pub mod run;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: SecretString,
        pro: bool,
    },
    Logout,
    Status,
}
