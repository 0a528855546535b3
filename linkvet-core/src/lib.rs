pub mod error;
pub mod report;
pub mod settings;
pub mod table;
pub mod validate;

use colored::Colorize;

pub use error::{InputError, SettingsError, ValidateError};
pub use settings::Settings;

pub fn print_banner() {
    println!(
        "{} {}",
        "linkvet".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "bulk address validation and normalization".bright_black());
    println!();
}
