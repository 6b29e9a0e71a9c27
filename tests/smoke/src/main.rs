#[macro_use]
extern crate log;
extern crate chrono;
extern crate env_logger;

use chrono::prelude::{DateTime, Local};
use std::io::Write;

extern crate cases;

fn init_logger() {
    env_logger::builder()
        .format(|buf, record| {
            let now: DateTime<Local> = Local::now();
            writeln!(
                buf,
                "{:5}: {} - {}",
                record.level(),
                now.format("%H:%M:%S.%3f"),
                record.args()
            )
        })
        .init();
}

fn main() {
    init_logger();

    info!("Stand-alone election smoke test started");

    cases::smoke::run();
    cases::cases::leader_failover::run();

    info!("Stand-alone election smoke test completed");
}
