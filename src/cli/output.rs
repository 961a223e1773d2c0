//! Terminal output for the artspace CLI

use colored::Colorize;

use crate::config::Config;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Environment name, red when serving real collectors
pub fn format_environment(config: &Config) -> String {
    if config.is_production() {
        "production".red().bold().to_string()
    } else {
        "development".yellow().to_string()
    }
}

/// One-screen summary of what the marketplace API will start with
pub fn print_server_summary(config: &Config, host: &str, port: u16) {
    info(&format!(
        "Marketplace API at {} ({})",
        format!("http://{}:{}", host, port).bold(),
        format_environment(config)
    ));
    println!(
        "  {} {}@{}:{}/{}",
        "database".dimmed(),
        config.database.user,
        config.database.host,
        config.database.port,
        config.database.dbname
    );
    println!(
        "  {} tokens {}h, sessions idle {}m, bcrypt cost {}",
        "auth".dimmed(),
        config.auth.token_ttl_hours,
        config.auth.session_ttl_minutes,
        config.auth.bcrypt_cost
    );
    if config.server.allowed_origins.is_empty() {
        warn("No CORS origins allowed; browser clients will be refused");
    } else {
        println!(
            "  {} {}",
            "origins".dimmed(),
            config.server.allowed_origins.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_format_environment_names_the_environment() {
        let mut config = Config::default();
        assert!(format_environment(&config).contains("development"));

        config.environment = Environment::Production;
        assert!(format_environment(&config).contains("production"));
    }
}
