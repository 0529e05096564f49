// Entrypoint for the superuser console.
// - Keeps `main` small: connect, authenticate, hand the session to the menu.
// - Fatal startup failures (unreachable backend, abandoned authentication)
//   exit the process from inside the UI flows; everything after that is a
//   normal menu loop until the operator exits.

use opshub_cli::ui;

fn main() -> anyhow::Result<()> {
    println!("Welcome to the OpsHub Superuser Console.");
    println!("Manage admin accounts and operational settings of an OpsHub backend system.");
    println!();

    let api = ui::connect()?;
    let session = ui::authenticate(&api)?;
    ui::main_menu(&api, &session)?;
    Ok(())
}
