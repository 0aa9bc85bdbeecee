use domain::services::{SensorReading, UnitNormalizer};

// (symbol, singular, plural)
const SPOKEN_UNITS: &[(&str, &str, &str)] = &[
    ("°C", "degree Celsius", "degrees Celsius"),
    ("°F", "degree Fahrenheit", "degrees Fahrenheit"),
    ("K", "kelvin", "kelvin"),
    ("%", "percent", "percent"),
    ("W", "watt", "watts"),
    ("kW", "kilowatt", "kilowatts"),
    ("Wh", "watt hour", "watt hours"),
    ("kWh", "kilowatt hour", "kilowatt hours"),
    ("V", "volt", "volts"),
    ("A", "ampere", "amperes"),
    ("hPa", "hectopascal", "hectopascals"),
    ("mbar", "millibar", "millibars"),
    ("lx", "lux", "lux"),
    ("ppm", "part per million", "parts per million"),
    ("dB", "decibel", "decibels"),
    ("km/h", "kilometer per hour", "kilometers per hour"),
    ("m/s", "meter per second", "meters per second"),
    ("mm", "millimeter", "millimeters"),
    ("cm", "centimeter", "centimeters"),
    ("km", "kilometer", "kilometers"),
    ("L", "liter", "liters"),
    ("m³", "cubic meter", "cubic meters"),
    ("µg/m³", "microgram per cubic meter", "micrograms per cubic meter"),
    ("s", "second", "seconds"),
    ("min", "minute", "minutes"),
    ("h", "hour", "hours"),
];

/// Expands unit symbols into words for numeric sensor readings.
///
/// Readings that are not numeric, or whose unit is unknown, are left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpokenUnitNormalizer;

impl UnitNormalizer for SpokenUnitNormalizer {
    fn normalize(&self, reading: &SensorReading) -> Option<SensorReading> {
        let number: f64 = reading.value.trim().parse().ok()?;
        if !number.is_finite() {
            return None;
        }
        let unit = reading.unit.trim();
        let (_, singular, plural) = SPOKEN_UNITS.iter().find(|(symbol, _, _)| *symbol == unit)?;
        let spoken_unit = if number == 1.0 { singular } else { plural };

        Some(SensorReading {
            name: reading.name.clone(),
            value: format_number(number),
            unit: spoken_unit.to_string(),
        })
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 {
        format!("{}", number as i64)
    } else {
        // drops trailing zeros such as "21.50"
        format!("{}", number)
    }
}
