use std::io::Write;

use flexi_logger::DeferredNow;
use log::Record;

/// `HH:MM:SS.mmm LEVEL [module] message`
pub fn cli_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format("%H:%M:%S%.3f"),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
