use json;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use itertools::Itertools;
use anyhow::{Context, Result};
use tracing::*;

use instances::dataset::{Dataset, IdxNameMap};
use instances::dataset::dispatch::WipBatches;
use wipdispatch::*;
use wipdispatch::config::PENALTY_POLICY_STRINGS;
use wipdispatch::data::load_batches;
use wipdispatch::dispatch::{plan, Plan, RoutePlan, Objective};
use wipdispatch::dispatch::audit::evaluate_instance;
use wipdispatch::dispatch::formulate::{FormulationKind, FORMULATION_STRINGS};
use wipdispatch::dispatch::ip::GoodLp;

mod common;
use common::*;

use structopt::StructOpt;

#[derive(Debug, Copy, Clone)]
enum Command {
    Solve,
    Audit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "solve" => Ok(Self::Solve),
            "audit" => Ok(Self::Audit),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}


/// Plan WIP cart dispatch for every batch file in a folder.
#[derive(Debug, StructOpt)]
struct ClArgs {
    /// `solve` writes a route plan per batch, `audit` re-reads written plans and scores them
    #[structopt(parse(try_from_str), possible_values=&["solve", "audit"])]
    command: Command,
    /// Travel-time table (FROM,TO,XFER_TIME)
    #[structopt(parse(from_os_str))]
    time_matrix: PathBuf,
    /// Cart roster (CART_ID,INIT_LOC)
    #[structopt(parse(from_os_str))]
    carts: PathBuf,
    /// Folder of WIP batches (WIP_ID,FROM,TO,Remaining Q-Time)
    #[structopt(parse(from_os_str))]
    wip_dir: PathBuf,
    #[structopt(long, parse(from_os_str), default_value="results")]
    output_dir: PathBuf,
    #[structopt(long, parse(try_from_str), possible_values=&FORMULATION_STRINGS, default_value="set-cover")]
    formulation: FormulationKind,
    #[structopt(long, parse(try_from_str), possible_values=&PENALTY_POLICY_STRINGS, default_value="independent")]
    penalty_policy: PenaltyPolicy,
    /// Weight of transport time (h)
    #[structopt(long, default_value="1", validator=clap_range_validator(Some(0.0), None))]
    transport_weight: f64,
    /// Weight of lateness (M)
    #[structopt(long, default_value="100000", validator=clap_range_validator(Some(0.0), None))]
    lateness_weight: f64,
    /// Tolerance when matching a solved cost to a route
    #[structopt(long, default_value="1e-5", validator=clap_range_validator(Some(0.0), None))]
    cost_tolerance: f64,
    #[structopt(long, short="c", default_value="1", validator=clap_range_validator(Some(1), None))]
    cpus: usize,
    #[structopt(flatten)]
    output: OutputOptions,
}

impl ClArgs {
    fn plan_config(&self) -> PlanConfig {
        PlanConfig {
            weights: Weights { h: self.transport_weight, m: self.lateness_weight },
            penalty_policy: self.penalty_policy,
            cost_tolerance: self.cost_tolerance,
        }
    }
}

/// `wip_data_<core>` is written to `wip_<core>_even.csv`.
fn plan_file_name(batch: &str) -> String {
    let core = batch.strip_prefix("wip_data_").unwrap_or(batch);
    format!("wip_{}_even.csv", core)
}


enum Outcome {
    Planned(Plan),
    Audited(Objective),
}

struct BatchOutcome {
    name: String,
    output: PathBuf,
    result: Result<Outcome, String>,
}

fn routes_json(routes: &RoutePlan) -> json::JsonValue {
    routes.rows.iter()
        .map(|r| json::object! {
            cart: r.cart.clone(),
            order: r.order,
            wip: r.wip.clone(),
            action: r.action.to_string(),
            complete_time: r.complete_time,
        })
        .collect_vec()
        .into()
}

impl BatchOutcome {
    fn to_json(&self, with_routes: bool) -> json::JsonValue {
        let mut root = json::object! {
            batch: self.name.clone(),
            output: self.output.display().to_string(),
        };
        match &self.result {
            Ok(Outcome::Planned(p)) => {
                root["plan"] = p.to_json_summary();
                if with_routes {
                    root["routes"] = routes_json(&p.routes);
                }
            },
            Ok(Outcome::Audited(obj)) => root["audit"] = obj.to_json(),
            Err(msg) => root["error"] = msg.clone().into(),
        }
        return root;
    }
}

struct RunReport {
    outcomes: Vec<BatchOutcome>,
}

impl RunReport {
    fn to_json(&self, fmt: ReportFormat) -> json::JsonValue {
        let with_routes = fmt == ReportFormat::Full;
        self.outcomes.iter().map(|o| o.to_json(with_routes)).collect_vec().into()
    }

    fn num_failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}


fn run_batch(batches: &WipBatches, idx: usize, output: &PathBuf, args: &ClArgs, cfg: &PlanConfig) -> Result<Outcome> {
    let data = batches.load_instance(idx)?;
    match args.command {
        Command::Solve => {
            let p = plan(&data, args.formulation, cfg, &GoodLp)?;
            p.routes.save(output)?;
            info!(output=?output, total_cost=p.audit.total_cost, "plan written");
            Ok(Outcome::Planned(p))
        },
        Command::Audit => {
            let routes = RoutePlan::load(output)?;
            let obj = evaluate_instance(&routes, &data, &cfg.weights);
            info!(?obj, "audited");
            Ok(Outcome::Audited(obj))
        },
    }
}

fn process_batch(batches: &WipBatches, idx: usize, args: &ClArgs, cfg: &PlanConfig) -> BatchOutcome {
    let name = match batches.index_to_name(idx) {
        Ok(n) => n.into_owned(),
        Err(_) => idx.to_string(),
    };
    let span = info_span!("batch", batch=%name);
    let _g = span.enter();

    let output = args.output_dir.join(plan_file_name(&name));
    let result = run_batch(batches, idx, &output, args, cfg).map_err(|e| {
        error!("{:#}", e);
        format!("{:#}", e)
    });
    BatchOutcome { name, output, result }
}


fn main() -> Result<()> {
    let args : ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.as_ref())?;
    debug!(?args);
    ThreadPoolBuilder::new().num_threads(args.cpus).build_global()?;

    let cfg = args.plan_config();
    let batches = load_batches(&args.time_matrix, &args.carts, &args.wip_dir)?;
    if let Command::Solve = args.command {
        std::fs::create_dir_all(&args.output_dir)
            .context(format!("failed to create {:?}", &args.output_dir))?;
    }
    info!(batches=batches.len(), formulation=%args.formulation, "start");

    let outcomes: Vec<BatchOutcome> = (0..batches.len())
        .into_par_iter()
        .map(|idx| process_batch(&batches, idx, &args, &cfg))
        .collect();
    let report = RunReport { outcomes };
    let mut out = args.output.report_writer()?;
    report.to_json(args.output.fmt).write_pretty(&mut out, 2)?;
    writeln!(out)?;
    out.flush()?;

    let failed = report.num_failed();
    if failed > 0 {
        anyhow::bail!("{} of {} batches failed", failed, report.outcomes.len());
    }
    Ok(())
}
