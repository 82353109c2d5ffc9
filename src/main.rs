use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use label_grid_pdf::{ExportOptions, FontWeight, PageGeometry, PageSize};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WeightArg {
    Regular,
    Bold,
}

/// Lay the Name/With columns of a spreadsheet out as centered labels on landscape PDF pages.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Input spreadsheet (.xlsx or .csv) with `Name` and `With` columns
    input: PathBuf,

    /// Output PDF path [default: input with a .pdf extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding Saysettha-Regular.ttf and Saysettha-Bold.ttf
    /// [default: $LABEL_GRID_FONTS, then the executable's directory]
    #[arg(long)]
    font_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Label rows per page
    #[arg(long, default_value_t = label_grid_pdf::DEFAULT_ROWS)]
    rows: usize,

    /// Label columns per page
    #[arg(long, default_value_t = label_grid_pdf::DEFAULT_COLUMNS)]
    columns: usize,

    /// Font size in points
    #[arg(long, default_value_t = label_grid_pdf::DEFAULT_FONT_SIZE)]
    font_size: f32,

    /// Font face used for the labels
    #[arg(long, value_enum, default_value = "bold")]
    weight: WeightArg,
}

impl Args {
    fn options(&self) -> ExportOptions {
        let size = match self.page_size {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        };
        ExportOptions {
            geometry: PageGeometry::with_grid(size, self.rows, self.columns),
            font_size: self.font_size,
            font_dir: self.font_dir.clone(),
            weight: match self.weight {
                WeightArg::Regular => FontWeight::Regular,
                WeightArg::Bold => FontWeight::Bold,
            },
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("pdf"));

    if output == args.input {
        eprintln!("Export failed: output would overwrite the input file");
        return ExitCode::FAILURE;
    }

    let mut progress = |msg: &str| println!("{msg}");
    match label_grid_pdf::run_export(&args.input, &output, &args.options(), &mut progress) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
