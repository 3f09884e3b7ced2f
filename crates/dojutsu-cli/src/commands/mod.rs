//! CLI command implementations

mod call;
mod config;
mod pipeline;
mod skills;
mod version;

pub use call::call_command;
pub use config::{config_init, config_path, config_show};
pub use pipeline::{byakugan_command, run_command, PipelineArgs};
pub use skills::{skills_check_command, skills_count_command, skills_list_command};
pub use version::version_command;

use crate::ipc::{DojutsuError, ErrorKind};
use crate::output::{print_error, print_info};

/// Print a failed command once, with a hint for the kinds a user can act on
pub fn report_failure(err: &anyhow::Error) {
    print_error(&format!("{:#}", err));

    let Some(err) = err.downcast_ref::<DojutsuError>() else {
        return;
    };
    match err.kind() {
        ErrorKind::TimeoutExceeded => {
            print_info("The daemon may still be working. Retry with a larger --timeout")
        }
        ErrorKind::MalformedResponse => {
            print_info("The daemon sent something this client cannot read. Check its logs")
        }
        _ => {}
    }
}
