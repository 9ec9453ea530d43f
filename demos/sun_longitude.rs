//! Print the Sun's ecliptic longitude for a list of instants
//!
//! Usage:
//!   cargo run --example sun_longitude -- [2010-06-21T11:28:00Z ...]
//!
//! With no arguments the current system time is used.

use solar_longitude::{CalendarTuple, SolarLongitudeCalculator, SystemClock};

/// Type alias for the error type used throughout this demo
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Print every stage of the calculation for one calculator
fn print_breakdown(sun: &SolarLongitudeCalculator) {
    let b = sun.breakdown();
    println!("{}", sun);
    println!("  Days since epoch:   {:>14.6}", b.days_since_epoch);
    println!("  Mean motion N:      {:>14.6}°", b.mean_motion);
    println!("  Mean anomaly M:     {:>14.6}°", b.mean_anomaly);
    println!("  Equation of center: {:>14.6}°", b.equation_of_center);
    println!("  Longitude λ:        {:>14.6}°", b.longitude);
}

fn main() -> Result<()> {
    println!("Solar Longitude Demonstration");
    println!("=============================\n");

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        let sun = SolarLongitudeCalculator::now(&SystemClock)?;
        print_breakdown(&sun);
        return Ok(());
    }

    for arg in &args {
        let instant: CalendarTuple = arg.parse()?;
        let sun = SolarLongitudeCalculator::from_instant(&instant)?;
        print_breakdown(&sun);
        println!();
    }

    Ok(())
}
