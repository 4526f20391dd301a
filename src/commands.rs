use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use tracing::info;
use transit_router_core::prelude::*;

use crate::AppError;
use crate::base::Base;
use crate::handler::{RequestHandler, build_catalogue};
use crate::requests::RequestDocument;

/// # Errors
///
/// Returns an error if the input can't be read or isn't a request document
pub fn read_document(reader: impl Read) -> Result<RequestDocument, AppError> {
    Ok(serde_json::from_reader(reader)?)
}

fn base_path(document: &RequestDocument) -> Result<PathBuf, AppError> {
    document
        .serialization_settings
        .as_ref()
        .map(|settings| settings.file.clone())
        .ok_or(AppError::MissingSection("serialization_settings"))
}

/// Builds the catalogue and the routing engine and writes them to the base
/// file named by the document. Returns the path of that file.
///
/// # Errors
///
/// Returns an error if a section is missing, the catalogue or settings are
/// invalid, or the base file can't be written
pub fn make_base(document: &RequestDocument) -> Result<PathBuf, AppError> {
    let path = base_path(document)?;
    let settings = document
        .routing_settings
        .ok_or(AppError::MissingSection("routing_settings"))?;

    let catalogue = build_catalogue(&document.base_requests)?;

    let now = Instant::now();
    let engine = RoutingEngine::build(&catalogue, settings)?;
    info!(
        "Built router with {} vertices and {} edges in {:?}",
        engine.vertex_count(),
        engine.edge_count(),
        now.elapsed()
    );

    Base::new(&catalogue, &engine).save(&path)?;
    Ok(path)
}

/// Loads the base file named by the document and writes a JSON array with
/// one response per stat request
///
/// # Errors
///
/// Returns an error if the base file is missing or damaged, or the output
/// can't be written
pub fn process_requests(
    document: &RequestDocument,
    mut writer: impl Write,
    pretty: bool,
) -> Result<(), AppError> {
    let path = base_path(document)?;
    let (catalogue, engine) = Base::load(&path)?.restore()?;

    let now = Instant::now();
    let responses =
        RequestHandler::new(&catalogue, &engine).handle_all(&document.stat_requests);
    info!(
        "Answered {} requests in {:?}",
        responses.len(),
        now.elapsed()
    );

    if pretty {
        serde_json::to_writer_pretty(&mut writer, &responses)?;
    } else {
        serde_json::to_writer(&mut writer, &responses)?;
    }
    writeln!(writer)?;
    Ok(())
}
