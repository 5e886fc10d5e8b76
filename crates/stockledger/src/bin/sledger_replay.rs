//! sledger-replay - Replay a ledger operation script.
//!
//! Primary binary for applying stock movements and reporting on the result.

fn main() -> std::process::ExitCode {
    stockledger::cmd::replay::main()
}
