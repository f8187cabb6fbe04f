use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let command_line_interface = runtype::cli::CommandLineInterface::load();
    // eprintln!("{command_line_interface:#?}");
    command_line_interface.run()
}
