//! Binding richer host types: maps, tuples, optionals, fixed buffers,
//! timestamps and a hand-written numeric adapter.
//!
//! Run with: cargo run --example bindings

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use json_descriptor::{
    element, field, from_str, to_string_pretty, CharBuf, Descriptor, Host, Numeric,
};
use std::error::Error;

/// Temperature kept in tenths of a degree, written as a decimal.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Tenths(i32);

impl Numeric for Tenths {
    fn write_decimal(&self, out: &mut String) {
        let sign = if self.0 < 0 { "-" } else { "" };
        out.push_str(&format!("{}{}.{}", sign, self.0.abs() / 10, self.0.abs() % 10));
    }

    fn read_decimal(&mut self, token: &str) -> bool {
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() && (v * 10.0).abs() <= f64::from(i32::MAX) => {
                self.0 = (v * 10.0).round() as i32;
                true
            }
            _ => false,
        }
    }
}

impl Host for Tenths {
    fn number(&self) -> Option<&dyn Numeric> {
        Some(self)
    }

    fn number_mut(&mut self) -> Option<&mut dyn Numeric> {
        Some(self)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Reading {
    station: CharBuf<8>,
    taken_at: DateTime<Utc>,
    position: (f64, f64),
    temperature: Tenths,
    humidity: Option<u8>,
    last_three: [i32; 3],
    labels: IndexMap<String, String>,
}

impl Host for Reading {}

fn main() -> Result<(), Box<dyn Error>> {
    let position = Descriptor::element_list(vec![
        element!((f64, f64), 0, Descriptor::number()),
        element!((f64, f64), 1, Descriptor::number()),
    ]);

    let desc = Descriptor::field_list(vec![
        field!(Reading, station, Descriptor::string()),
        field!("takenAt", Reading, taken_at, Descriptor::string()),
        field!(Reading, position, position),
        field!(Reading, temperature, Descriptor::number()),
        field!(Reading, humidity, Descriptor::optional(Descriptor::number())?),
        field!("lastThree", Reading, last_three, Descriptor::array(Descriptor::number())),
        field!(Reading, labels, Descriptor::object(Descriptor::string())),
    ]);

    let input = r#"{
        "station": "OSLO-BLINDERN",
        "takenAt": "2024-03-01T06:00:00Z",
        "position": [59.94, 10.72],
        "temperature": -3.4,
        "humidity": null,
        "lastThree": [1, 2, 3, 4, 5],
        "labels": { "region": "east", "source": "manual", "region": "south" },
        "firmware": { "build": [2, 1], "notes": null }
    }"#;

    let reading: Reading = from_str(input, &desc)?;

    // The 8-byte buffer keeps 7 bytes plus its terminator.
    println!("station     {:?}", reading.station.as_str());
    println!("taken at    {}", reading.taken_at);
    println!("position    {:?}", reading.position);
    println!("temperature {:?}", reading.temperature);
    println!("humidity    {:?}", reading.humidity);
    // Extra elements beyond the array length are dropped.
    println!("last three  {:?}", reading.last_three);
    // A repeated key keeps its first position and its last value.
    println!("labels      {:?}\n", reading.labels);

    println!("{}", to_string_pretty(&reading, &desc));

    Ok(())
}
