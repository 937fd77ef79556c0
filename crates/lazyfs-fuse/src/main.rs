//! Mount binary for the lazyfs storage-free virtual filesystem.
//!
//! Usage:
//!   lazyfs [-o option[,option...]] <mountpoint>
//!
//! The mountpoint is required. `-o` options are passed through to the
//! FUSE transport uninterpreted (e.g. `-o allow_other,auto_unmount`).

use std::path::PathBuf;
use std::process::ExitCode;

use fuser::MountOption;
use lazyfs_fuse::{mount, LazyFuse};

/// CLI arguments for the lazyfs binary.
struct CliArgs {
    /// Where to mount the filesystem.
    mountpoint: PathBuf,
    /// Pass-through mount options.
    options: Vec<MountOption>,
}

impl CliArgs {
    /// Parse CLI arguments.
    ///
    /// # Returns
    /// Parsed arguments, or None if the usage message was printed.
    fn parse(args: &[String]) -> Option<Self> {
        if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
            Self::print_usage(&args[0]);
            return None;
        }

        let mut mountpoint: Option<PathBuf> = None;
        let mut options: Vec<MountOption> = Vec::new();

        let mut iter = args[1..].iter();
        while let Some(arg) = iter.next() {
            if arg == "-o" {
                let Some(list) = iter.next() else {
                    eprintln!("Missing argument to -o");
                    Self::print_usage(&args[0]);
                    return None;
                };
                for opt in list.split(',').filter(|o| !o.is_empty()) {
                    options.push(parse_mount_option(opt));
                }
            } else if mountpoint.is_none() {
                mountpoint = Some(PathBuf::from(arg));
            } else {
                eprintln!("Unexpected argument: {}", arg);
                Self::print_usage(&args[0]);
                return None;
            }
        }

        match mountpoint {
            Some(mountpoint) => Some(Self {
                mountpoint,
                options,
            }),
            None => {
                Self::print_usage(&args[0]);
                None
            }
        }
    }

    /// Print the usage message to standard error.
    fn print_usage(program: &str) {
        eprintln!("Usage:");
        eprintln!("    {} [-o option[,option...]] <mountpoint>", program);
    }
}

/// Map a `-o` option string to a FUSE mount option.
fn parse_mount_option(opt: &str) -> MountOption {
    match opt {
        "auto_unmount" => MountOption::AutoUnmount,
        "allow_other" => MountOption::AllowOther,
        "allow_root" => MountOption::AllowRoot,
        "default_permissions" => MountOption::DefaultPermissions,
        "dev" => MountOption::Dev,
        "nodev" => MountOption::NoDev,
        "suid" => MountOption::Suid,
        "nosuid" => MountOption::NoSuid,
        "ro" => MountOption::RO,
        "rw" => MountOption::RW,
        "exec" => MountOption::Exec,
        "noexec" => MountOption::NoExec,
        "atime" => MountOption::Atime,
        "noatime" => MountOption::NoAtime,
        "dirsync" => MountOption::DirSync,
        "sync" => MountOption::Sync,
        "async" => MountOption::Async,
        other => MountOption::CUSTOM(other.to_string()),
    }
}

/// Check whether the process runs with superuser privileges.
fn running_as_root() -> bool {
    unsafe { libc::getuid() == 0 || libc::geteuid() == 0 }
}

fn main() -> ExitCode {
    if running_as_root() {
        eprintln!("Cannot mount lazyfs as root because it is not secure.");
        return ExitCode::FAILURE;
    }

    let args: Vec<String> = std::env::args().collect();
    let Some(cli) = CliArgs::parse(&args) else {
        return ExitCode::FAILURE;
    };

    tracing_subscriber::fmt::init();

    let fs = LazyFuse::new();
    tracing::info!("mounting lazyfs at {}", cli.mountpoint.display());
    if let Err(err) = mount(fs, &cli.mountpoint, &cli.options) {
        eprintln!("Mount failed: {}", err);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_requires_mountpoint() {
        assert!(CliArgs::parse(&args(&["lazyfs"])).is_none());
    }

    #[test]
    fn test_parse_mountpoint_only() {
        let cli = CliArgs::parse(&args(&["lazyfs", "/mnt/fake"])).unwrap();
        assert_eq!(cli.mountpoint, PathBuf::from("/mnt/fake"));
        assert!(cli.options.is_empty());
    }

    #[test]
    fn test_parse_passes_options_through() {
        let cli = CliArgs::parse(&args(&["lazyfs", "-o", "allow_other,foo=bar", "/mnt/fake"]))
            .unwrap();
        assert_eq!(cli.mountpoint, PathBuf::from("/mnt/fake"));
        assert_eq!(
            cli.options,
            vec![
                MountOption::AllowOther,
                MountOption::CUSTOM("foo=bar".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_rejects_extra_positional() {
        assert!(CliArgs::parse(&args(&["lazyfs", "/a", "/b"])).is_none());
    }

    #[test]
    fn test_parse_rejects_dangling_o() {
        assert!(CliArgs::parse(&args(&["lazyfs", "/mnt", "-o"])).is_none());
    }
}
