use colored::Colorize;

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// One aligned `label: value` line.
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{:>14}: {}", label.cyan(), value);
}
