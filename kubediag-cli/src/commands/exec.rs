use crate::output;
use anyhow::Result;
use kubediag_core::exec::ExecOutput;
use kubediag_core::trace;
use kubediag_core::{CommandExecutor, DiagClient, DiagConfig, PodExecutor};

fn report(result: &ExecOutput) {
    print!("{}", result.stdout);
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }
    match result.exit_code {
        Some(0) => {}
        Some(code) => output::print_warning(&format!("Command exited with code {}", code)),
        None => output::print_warning("No exit status received"),
    }
}

pub async fn handle_exec_command(
    client: &DiagClient,
    config: &DiagConfig,
    namespace: &str,
    pod: &str,
    container: &str,
    command: &str,
) -> Result<()> {
    let executor = PodExecutor::new(client.clone());
    let result = executor
        .execute(namespace, pod, container, command, config.exec.timeout())
        .await?;

    report(&result);
    Ok(())
}

pub async fn handle_debug_level_command(
    client: &DiagClient,
    config: &DiagConfig,
    namespace: &str,
    pod: &str,
    container: &str,
    level: &str,
    port: u16,
) -> Result<()> {
    let executor = PodExecutor::new(client.clone());
    let result = trace::set_debug_level(
        &executor,
        namespace,
        pod,
        container,
        level,
        port,
        config.exec.timeout(),
    )
    .await?;

    if result.succeeded() {
        output::print_success(&format!("Trace level of {}/{} set to {}", namespace, pod, level));
    }
    report(&result);
    Ok(())
}
