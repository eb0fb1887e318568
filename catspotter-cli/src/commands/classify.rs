//! `catspotter classify` - accuracy tier lookup.

use catspotter::location::{classify, is_acceptable, ACCEPTABLE_ACCURACY_METERS};

use crate::error::CliError;

/// Print the tier and acceptability of an accuracy radius.
pub fn run(meters: f64) -> Result<(), CliError> {
    println!("{}", describe(meters));
    Ok(())
}

fn describe(meters: f64) -> String {
    let acceptable = if is_acceptable(meters) {
        "acceptable".to_string()
    } else {
        format!("not acceptable (> {}m)", ACCEPTABLE_ACCURACY_METERS)
    };
    format!("{}m: {} - {}", meters, classify(meters), acceptable)
}
