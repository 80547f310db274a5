//! Tuning the writer layout and the parser limits.
//!
//! Run with: cargo run --example custom_options

use json_descriptor::{
    field, from_str_with_options, to_string_with_options, CharBuf, Descriptor, FormatOptions,
    Host, Indent, ParseOptions,
};
use std::error::Error;

#[derive(Debug, Default, Clone)]
struct Config {
    name: String,
    version: String,
    debug: bool,
    ports: Vec<u16>,
}

impl Host for Config {}

fn main() -> Result<(), Box<dyn Error>> {
    let desc = Descriptor::field_list(vec![
        field!(Config, name, Descriptor::string()),
        field!(Config, version, Descriptor::string()),
        field!(Config, debug, Descriptor::boolean()),
        field!(Config, ports, Descriptor::array(Descriptor::number())),
    ]);

    let config = Config {
        name: "MyApp".to_string(),
        version: "1.0.0".to_string(),
        debug: true,
        ports: vec![8080, 8443],
    };

    println!("Dense:");
    println!("{}\n", to_string_with_options(&config, &desc, FormatOptions::dense()));

    println!("Pretty (tabs, short arrays inline):");
    println!("{}\n", to_string_with_options(&config, &desc, FormatOptions::pretty()));

    println!("Pretty with two-space indent, every array broken:");
    let options = FormatOptions::pretty()
        .with_indent(Indent::Spaces(2))
        .with_newline_trivial_arrays(true);
    println!("{}\n", to_string_with_options(&config, &desc, options));

    println!("Spaced but single-line:");
    let options = FormatOptions::pretty().with_newline_elements(false);
    println!("{}\n", to_string_with_options(&config, &desc, options));

    // A shallow depth ceiling rejects nesting beyond it.
    let nested = Descriptor::array(Descriptor::array(Descriptor::number()));
    let shallow = ParseOptions::new().with_max_depth(1);
    match from_str_with_options::<Vec<Vec<i32>>>("[[1]]", &nested, shallow) {
        Ok(_) => println!("parsed"),
        Err(e) => println!("Rejected: {}\n", e),
    }

    // Fixed buffers can skip the terminator slot and use every byte.
    let tag = Descriptor::string();
    let terminated: CharBuf<4> = from_str_with_options(r#""abcdef""#, &tag, ParseOptions::new())?;
    let full: CharBuf<4> = from_str_with_options(
        r#""abcdef""#,
        &tag,
        ParseOptions::new().with_terminate_char_buffers(false),
    )?;
    println!("Terminated buffer holds {:?}", terminated.as_str());
    println!("Unterminated buffer holds {:?}", full.as_str());

    Ok(())
}
