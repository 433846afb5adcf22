use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub fn create_progress_bar(multi: &MultiProgress, total_inputs: usize) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new(total_inputs as u64));
    pb.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} datagrams ({percent}%)\n{msg} | elapsed: {elapsed_precise}",
    )?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("decoding");

    Ok(pb)
}

/// Prints through the progress bar when one is active so output stays intact.
pub fn print_with(pb: Option<&ProgressBar>, text: &str) {
    match pb {
        Some(pb) => pb.suspend(|| print!("{text}")),
        None => print!("{text}"),
    }
}
