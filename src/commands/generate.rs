use crate::{Cli, Error, FileEmitter, GeneratorConfig, discover_schema};
use halgen_codegen::{EntityTransformer, EntityWriter, Schema};
use tracing_subscriber::{EnvFilter, prelude::*};

pub async fn run_generate_command(cli: Cli) -> Result<(), Error> {
    let config = GeneratorConfig::try_from(&cli)?;

    if cli.verbose {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    } else {
        let filter_layer = EnvFilter::new("halgen=info,halgen_codegen=info");
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(false)
            .without_time();

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    }

    let connection = &config.connection;
    println!(
        "Connecting to {} database `{}` at {}:{} ...",
        connection.dialect, connection.name, connection.host, connection.port
    );
    let schema = discover_schema(connection).await?;
    println!("... discovered.");

    generate(&schema, &config)?;

    println!("... Done.");
    Ok(())
}

/// Synthesizes, renders and emits one module per table of `schema`, in
/// discovery order, skipping ignored tables. Stops at the first failing table.
///
/// Returns the names of the files written.
pub fn generate(schema: &Schema, config: &GeneratorConfig) -> Result<Vec<String>, Error> {
    let emitter = FileEmitter::new(&config.output_dir, &config.formatter);
    let mut written = Vec::new();
    for table in schema.tables.iter() {
        if config.is_ignored(table) {
            continue;
        }
        let entity = EntityTransformer::transform(schema, table, &config.codegen)?;
        let output = EntityWriter::write_entity(&entity, &config.codegen);
        let bytes = emitter.emit(&output)?;
        println!("{table}: Ok {bytes}");
        written.push(output.name);
    }
    Ok(written)
}
