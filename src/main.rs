use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use offerexport::{
    cli::{self, Command, FilterArgs, HistoryAction},
    config::{self, Config},
    export::ExportConfig,
    history::{self, DurableStorage, ExportHistory, FileStorage, MemoryStorage},
    logging,
    session::ExportSession,
    util,
    view::{self, PreviewState, SortDirection, SortSpec},
};

fn main() -> Result<()> {
    logging::init_logging();

    let cli_opts = cli::parse();
    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let cfg = loaded.config;
    info!("config_hash={}", loaded.config_hash);

    let mut history = open_history(&cfg);

    match cli_opts.command {
        Command::Preview {
            filters,
            sort,
            asc,
            page,
            page_size,
            search,
        } => {
            let mut session = open_session(&filters, &mut history, &cfg)?;
            session.apply_filters(util::criteria_from_cli(&filters)?);

            let mut state = PreviewState::new(page_size.unwrap_or(cfg.page_size));
            let direction = if asc { SortDirection::Asc } else { SortDirection::Desc };
            state.set_sort(SortSpec::new(util::sort_field_from_cli(sort), direction));
            if let Some(term) = search {
                state.set_search(term);
            }
            if page != 1 && !state.go_to(session.filtered(), page) {
                warn!("page {page} is out of range; showing page 1");
            }

            let page_view = session.preview(&state);
            for record in &page_view.records {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.id,
                    view::display_timestamp(record),
                    record.title,
                    record.company,
                    record.location
                );
            }
            println!(
                "Página {} de {} | Mostrando {} de {} registros",
                page_view.page,
                page_view.display_total_pages(),
                page_view.records.len(),
                session.filtered().len()
            );
        }
        Command::Export {
            filters,
            fields,
            delimiter,
            no_headers,
            date_format,
            output,
        } => {
            let (selection, unknown) = util::selection_from_keys(fields.as_deref());
            for key in unknown {
                warn!("unknown field in --fields: {key}");
            }
            let mut options = cfg.export_options();
            if let Some(d) = delimiter {
                options.delimiter = util::delimiter_from_cli(d);
            }
            if let Some(f) = date_format {
                options.date_format = util::date_format_from_cli(f);
            }
            if no_headers {
                options.include_headers = false;
            }
            let export_config = ExportConfig {
                fields: selection,
                options,
            };

            util::ensure_output_dir(&output)?;
            let mut session = open_session(&filters, &mut history, &cfg)?;
            session.apply_filters(util::criteria_from_cli(&filters)?);
            let outcome = match session.export(&export_config) {
                Ok(outcome) => outcome,
                Err(err) if err.is_validation() => bail!("export rejected: {err}"),
                Err(err) => return Err(err.into()),
            };
            write_export(&output, &outcome.file.filename, &outcome.file.content)?;
            println!(
                "{}\t{} registros\tid={}",
                output.join(&outcome.file.filename).display(),
                outcome.file.rows,
                outcome.entry.id
            );
        }
        Command::History { action } => match action {
            HistoryAction::List { search } => {
                let entries = history.list(search.as_deref());
                if entries.is_empty() {
                    println!("No hay historial de exportaciones");
                }
                for entry in entries {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        entry.id,
                        entry.date,
                        entry.filename,
                        entry.records,
                        history::format_fields(&entry.fields)
                    );
                }
            }
            HistoryAction::Remove { id } => {
                history.remove(&id);
            }
            HistoryAction::Clear { yes } => {
                if !yes {
                    bail!("refusing to clear export history without --yes");
                }
                history.clear();
            }
        },
    }

    Ok(())
}

fn open_history(cfg: &Config) -> ExportHistory {
    let dir = cfg.storage_dir();
    let storage: Box<dyn DurableStorage> = match FileStorage::open(&dir) {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            warn!(
                "history storage unavailable at {}: {err}; keeping history in memory",
                dir.display()
            );
            Box::new(MemoryStorage::new())
        }
    };
    ExportHistory::open_with(storage, &cfg.history_key, cfg.history_capacity)
}

fn open_session<'h>(
    filters: &FilterArgs,
    history: &'h mut ExportHistory,
    cfg: &Config,
) -> Result<ExportSession<'h>> {
    let records = util::load_records(&filters.input)?;
    Ok(ExportSession::new(records, history, &cfg.filename_base))
}

fn write_export(dir: &Path, filename: &str, content: &str) -> Result<()> {
    let path = dir.join(filename);
    std::fs::write(&path, content.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
