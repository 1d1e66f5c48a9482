//! services/cms/src/bin/hash_password.rs
//!
//! Prints the argon2 hash of a password, ready to paste into `users.yml`:
//!
//! ```text
//! hash_password admin secret   # admin: $argon2id$...
//! hash_password secret         # $argon2id$...
//! ```

use cms_lib::adapters::hash_password;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [password] => println!("{}", hash_password(password)?),
        [username, password] => println!("{}: '{}'", username, hash_password(password)?),
        _ => {
            eprintln!("usage: hash_password [USERNAME] PASSWORD");
            std::process::exit(2);
        }
    }
    Ok(())
}
