//! Describing a struct once and using the descriptor in both directions.
//!
//! Run with: cargo run --example simple

use json_descriptor::{field, from_str, to_string, to_string_pretty, Descriptor, Host};
use std::error::Error;

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

impl Host for User {}

fn main() -> Result<(), Box<dyn Error>> {
    let user = Descriptor::field_list(vec![
        field!(User, id, Descriptor::number()),
        field!(User, name, Descriptor::string()),
        field!(User, email, Descriptor::string()),
    ]);
    let users_desc = Descriptor::array(user);

    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
        },
    ];

    let dense = to_string(&users, &users_desc);
    println!("Dense:\n{}\n", dense);
    println!("Pretty:\n{}\n", to_string_pretty(&users, &users_desc));

    let users_back: Vec<User> = from_str(&dense, &users_desc)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}
