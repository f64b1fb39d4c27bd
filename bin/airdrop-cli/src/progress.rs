// SPDX-License-Identifier: MIT
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["-", "\\", "|", "/", "+"]));
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn complete(pb: &ProgressBar, template: &str, msg: &str) {
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style);
    }
    pb.finish_with_message(msg.to_string());
}

pub fn finish(pb: &ProgressBar, msg: &str) {
    complete(pb, "✓ {msg}", msg);
}

pub fn fail(pb: &ProgressBar, msg: &str) {
    complete(pb, "✗ {msg}", msg);
}
