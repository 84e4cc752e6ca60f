//! Global error handling utilities

use crate::{config::ConfigError, eth::EthError};

/// Initialize error handling for the application
pub fn install_error_handlers() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Replace the color-eyre panic hook so panics also reach the log pipeline
    std::panic::set_hook(Box::new(|panic_info| {
        if let Some(location) = panic_info.location() {
            tracing::error!(
                message = %panic_info,
                panic.file = location.file(),
                panic.line = location.line(),
                panic.column = location.column(),
                "Application panic"
            );
        } else {
            tracing::error!(message = %panic_info, "Application panic");
        }

        // Test frameworks report panics themselves
        if std::env::var_os("RUST_TEST").is_some() {
            return;
        }

        eprintln!("The application panicked! This is a bug and should be reported.");

        if let Some(location) = panic_info.location() {
            eprintln!(
                "Panic occurred at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }

        if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            eprintln!("Panic message: {}", s);
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            eprintln!("Panic message: {}", s);
        }

        eprintln!("Stack trace:");
        let backtrace = std::backtrace::Backtrace::force_capture();
        eprintln!("{}", backtrace);
    }));

    Ok(())
}

/// Process exit code for a failed plugin invocation.
///
/// Configuration problems and bad input are distinguished from node failures and timeouts
/// so scripts can decide whether a retry makes sense.
pub fn exit_code(error: &EthError) -> i32 {
    match error {
        EthError::UnknownNetwork { .. } |
        EthError::InvalidDefaultNetwork(_) |
        EthError::DuplicateNetwork(_) |
        EthError::SignerMissing |
        EthError::InvalidPrivateKey |
        EthError::MnemonicError(_) |
        EthError::WalletError(_) => 78,
        EthError::InvalidArgument(_) |
        EthError::UnknownMethod(_) |
        EthError::Serialization(_) => 64,
        EthError::ProviderError(_) => 69,
        EthError::Timeout { .. } => 75,
    }
}

/// Exit code for configuration that failed to load or validate.
pub fn config_exit_code(error: &ConfigError) -> i32 {
    match error {
        ConfigError::Provider(inner) => exit_code(inner),
        _ => 78,
    }
}
