//! Command handlers: one function per subcommand, all over one connection.

use crate::cli::{AddArgs, Commands, EditArgs, LoginArgs, PrintArgs, ScanArgs, SignupArgs};
use crate::error::{CliError, CliResult};
use crate::output::{self, emit, OutputMode};
use colis_core::label::parse_label;
use colis_core::print::{PrintDocument, PrintOutcome, PrinterRegistry, SpoolPrinter};
use colis_core::{
    AuthService, RecordFields, RecordService, RecordServiceError, SqliteRecordRepository,
    SqliteUserRepository,
};
use log::info;
use rusqlite::Connection;
use serde_json::json;
use std::io::Read;
use std::sync::Arc;

const SPOOL_PRINTER_ID: &str = "spool";

pub fn run(conn: &Connection, command: Commands, mode: OutputMode) -> CliResult<()> {
    match command {
        Commands::Signup(args) => signup(conn, args, mode),
        Commands::Login(args) => login(conn, args, mode),
        Commands::Add(args) => add(conn, args, mode),
        Commands::List => {
            let records = record_service(conn)?.list_records()?;
            emit(mode, &records, &output::record_table(&records))
        }
        Commands::Search(args) => {
            let records = record_service(conn)?.search_records(&args.text)?;
            emit(mode, &records, &output::record_table(&records))
        }
        Commands::Show(args) => {
            let record = record_service(conn)?
                .get_record(args.id)?
                .ok_or(RecordServiceError::NotFound(args.id))?;
            emit(mode, &record, &output::record_detail(&record))
        }
        Commands::Edit(args) => edit(conn, args, mode),
        Commands::Delete(args) => {
            record_service(conn)?.delete_record(args.id)?;
            emit(
                mode,
                &json!({ "deleted": args.id }),
                &format!("record #{} deleted", args.id),
            )
        }
        Commands::History(args) => {
            let entries = record_service(conn)?.modification_history(args.id)?;
            emit(mode, &entries, &output::history_table(&entries))
        }
        Commands::Label(args) => {
            let payload = record_service(conn)?.label_payload(args.id)?;
            emit(
                mode,
                &json!({ "id": args.id, "payload": payload }),
                payload.trim_end(),
            )
        }
        Commands::Scan(args) => scan(args, mode),
        Commands::Print(args) => print(conn, args, mode),
    }
}

fn record_service(conn: &Connection) -> CliResult<RecordService<SqliteRecordRepository<'_>>> {
    Ok(RecordService::new(SqliteRecordRepository::try_new(conn)?))
}

fn auth_service(conn: &Connection) -> CliResult<AuthService<SqliteUserRepository<'_>>> {
    Ok(AuthService::new(SqliteUserRepository::try_new(conn)?))
}

fn signup(conn: &Connection, args: SignupArgs, mode: OutputMode) -> CliResult<()> {
    let id = auth_service(conn)?.sign_up(&args.username, &args.password, &args.confirm)?;
    emit(
        mode,
        &json!({ "user_id": id }),
        &format!("account created (user #{id})"),
    )
}

fn login(conn: &Connection, args: LoginArgs, mode: OutputMode) -> CliResult<()> {
    let user = auth_service(conn)?.log_in(&args.username, &args.password)?;
    emit(mode, &user, &format!("welcome, {}", user.username))
}

fn add(conn: &Connection, args: AddArgs, mode: OutputMode) -> CliResult<()> {
    let mut fields = RecordFields::new();
    apply_assignments(&mut fields, args.set)?;
    let record = record_service(conn)?.create_record(&fields)?;
    emit(
        mode,
        &record,
        &format!("record #{} created\n{}", record.id, output::record_detail(&record)),
    )
}

fn edit(conn: &Connection, args: EditArgs, mode: OutputMode) -> CliResult<()> {
    let service = record_service(conn)?;
    let current = service
        .get_record(args.id)?
        .ok_or(RecordServiceError::NotFound(args.id))?;

    let mut fields = RecordFields::from_details(&current.details);
    apply_assignments(&mut fields, args.set)?;
    let record = service.update_record(args.id, &fields)?;
    emit(
        mode,
        &record,
        &format!("record #{} updated\n{}", record.id, output::record_detail(&record)),
    )
}

fn scan(args: ScanArgs, mode: OutputMode) -> CliResult<()> {
    let text = match args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let payload = parse_label(&text)?;
    emit(mode, &payload, &output::scanned_payload(&payload))
}

fn print(conn: &Connection, args: PrintArgs, mode: OutputMode) -> CliResult<()> {
    let record = record_service(conn)?
        .get_record(args.id)?
        .ok_or(RecordServiceError::NotFound(args.id))?;

    let mut registry = PrinterRegistry::new();
    registry.register(Arc::new(SpoolPrinter::new(SPOOL_PRINTER_ID, args.spool_dir)))?;
    registry.select_active(SPOOL_PRINTER_ID)?;

    let outcome = registry.print_active(&PrintDocument::shipping_label(&record))?;
    match &outcome {
        PrintOutcome::Printed { reference, .. } => {
            info!("event=cli_print module=cli status=ok record_id={}", record.id);
            emit(mode, &outcome, &format!("label for #{} sent to {reference}", record.id))
        }
        PrintOutcome::Failed { reason, .. } => Err(CliError::PrintFailed(reason.clone())),
    }
}

fn apply_assignments(
    fields: &mut RecordFields,
    assignments: Vec<(String, String)>,
) -> CliResult<()> {
    for (key, value) in assignments {
        if !fields.set_key(&key, value) {
            return Err(CliError::UnknownField(key));
        }
    }
    Ok(())
}
