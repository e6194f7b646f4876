//! A counter kept in `#count=N`, driven against an in-memory tab.
//!
//! Run with `cargo run -p bindings --example hash_counter`.

use bindings::{Binding, HashBinding, RESET, SetAction};
use platform::MemoryHistory;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let tab = MemoryHistory::new("http://localhost/counter")?;
    let _window = platform::install(tab.clone());

    let count = HashBinding::json("count", 1_i64);
    let _render = count.subscribe({
        let count = count.clone();
        move || println!("render: count = {}", count.read())
    });
    println!("initial: count = {} at {}", count.read(), tab.href());

    count.set(2)?;
    println!("after write: {}", tab.href());

    count.write(SetAction::update(|n: &i64| n * 10))?;
    println!("after update: {}", tab.href());

    tab.set_hash("count=3");
    tab.dispatch_pending();
    println!("after manual edit: count = {}", count.read());

    tab.back();
    tab.dispatch_pending();
    println!("after back: count = {} at {}", count.read(), tab.href());

    count.write(RESET)?;
    println!(
        "after reset: count = {} at {} ({} history entries)",
        count.read(),
        tab.href(),
        tab.length()
    );
    Ok(())
}
