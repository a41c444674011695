use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use engine::{
    snapshot_exists, IdentityNormalizer, Index, QueryOutcome, StemNormalizer,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a boolean term index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from the files in a directory and save a snapshot
    Build {
        /// Directory containing the document files
        #[arg(long)]
        input: PathBuf,
        /// Snapshot destination path
        #[arg(long)]
        output: PathBuf,
        /// Stem tokens (Porter-style English) before indexing
        #[arg(long, default_value_t = false)]
        stem: bool,
    },
    /// Answer boolean AND queries against a saved snapshot
    Search {
        /// Snapshot path
        #[arg(long)]
        index: PathBuf,
        /// One-shot query; omit for an interactive prompt
        #[arg(long)]
        query: Option<String>,
        /// Print outcomes as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print every term with its document frequency and posting doc ids
    Dump {
        /// Snapshot path
        #[arg(long)]
        index: PathBuf,
        /// Print the catalog and dictionary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stem } => build(&input, &output, stem),
        Commands::Search { index, query, json } => search(&index, query.as_deref(), json),
        Commands::Dump { index, json } => dump(&index, json),
    }
}

fn build(input: &Path, output: &Path, stem: bool) -> Result<()> {
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    // Doc ids follow path order, so the same directory always yields the
    // same ids.
    files.sort();
    ensure!(!files.is_empty(), "no files found under {}", input.display());

    let mut index = Index::new();
    let report = if stem {
        index.build(&files, &StemNormalizer::new())
    } else {
        index.build(&files, &IdentityNormalizer)
    };
    tracing::info!(
        docs = index.doc_count(),
        terms = index.term_count(),
        skipped = report.skipped.len(),
        "index built"
    );

    index
        .save(output)
        .with_context(|| format!("saving snapshot to {}", output.display()))?;
    tracing::info!(output = %output.display(), "snapshot written");
    Ok(())
}

fn load_index(path: &Path) -> Result<Index> {
    ensure!(snapshot_exists(path), "no snapshot at {}", path.display());
    let (index, report) =
        Index::load(path).with_context(|| format!("loading snapshot from {}", path.display()))?;
    if report.malformed_catalog > 0 || report.malformed_dictionary > 0 {
        tracing::warn!(
            catalog = report.malformed_catalog,
            dictionary = report.malformed_dictionary,
            "skipped malformed snapshot lines"
        );
    }
    Ok(index)
}

fn search(path: &Path, query: Option<&str>, json: bool) -> Result<()> {
    let index = load_index(path)?;

    if let Some(phrase) = query {
        return answer(&index, phrase, json);
    }

    let stdin = io::stdin();
    loop {
        print!("search> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let phrase = line.trim();
        if phrase.is_empty() {
            break;
        }
        answer(&index, phrase, json)?;
    }
    Ok(())
}

fn answer(index: &Index, phrase: &str, json: bool) -> Result<()> {
    let outcome = index.boolean_and(phrase);
    if json {
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }
    match outcome {
        QueryOutcome::Matches(matches) => {
            for m in &matches {
                println!("\t{} - {} - {}", m.doc_id, m.title, m.length);
            }
        }
        QueryOutcome::NoResults(reason) => {
            tracing::debug!(?reason, "no matches");
            println!("No documents found for: {phrase}");
        }
    }
    Ok(())
}

fn dump(path: &Path, json: bool) -> Result<()> {
    let index = load_index(path)?;

    if json {
        let terms: Vec<serde_json::Value> = index
            .terms_sorted()
            .into_iter()
            .map(|(term, entry)| {
                serde_json::json!({
                    "term": term,
                    "document_frequency": entry.document_frequency(),
                    "collection_term_frequency": entry.collection_term_frequency(),
                    "doc_ids": entry.postings().doc_ids().collect::<Vec<_>>(),
                })
            })
            .collect();
        let out = serde_json::json!({
            "documents": index.documents_sorted(),
            "terms": terms,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (term, entry) in index.terms_sorted() {
        let ids: Vec<String> = entry.postings().doc_ids().map(|id| id.to_string()).collect();
        println!(
            "** [{},{}] --> [{}]",
            term,
            entry.document_frequency(),
            ids.join(",")
        );
    }
    println!("Number of terms = {}", index.term_count());
    Ok(())
}
