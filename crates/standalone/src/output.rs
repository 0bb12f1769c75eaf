use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;

use standalone_runtime::BuildEvent;

/// Pipeline reporter printing one line per step
pub fn print_event(event: &BuildEvent) {
    match event {
        BuildEvent::BuildingInto(dir) => {
            println!("{} Building into: {}", "→".cyan(), dir.display());
        }
        BuildEvent::FetchingRuntime(url) => {
            println!("{} Downloading {}", "→".cyan(), url);
        }
        BuildEvent::InstallingInstaller => {
            println!("{} Installing pip", "→".cyan());
        }
        BuildEvent::InstallingApplication(requirement) => {
            println!("{} Installing {}", "→".cyan(), requirement);
        }
        BuildEvent::Archiving(_) => {
            print!("{} Creating archive... ", "→".cyan());
            io::stdout().flush().ok();
        }
        BuildEvent::Archived(_) => {
            println!("{}", "Done".green());
        }
    }
}

/// Download progress, rewritten in place
pub fn print_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let percent = (downloaded as f64 / total as f64 * 100.0) as u8;
        let mb_downloaded = downloaded as f64 / 1_048_576.0;
        let mb_total = total as f64 / 1_048_576.0;
        print!(
            "\r  Progress: {:.1} / {:.1} MB ({}%)",
            mb_downloaded, mb_total, percent
        );
        io::stdout().flush().ok();

        if downloaded == total {
            println!();
        }
    }
}

pub fn print_artifacts(artifacts: &[PathBuf]) {
    println!();
    println!("{}", "Created:".green().bold());
    for artifact in artifacts {
        println!("  {}", artifact.display());
    }
}
