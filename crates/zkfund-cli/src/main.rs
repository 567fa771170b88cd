//! zkfund CLI - campaign/funding simulator and attestation inspector
//!
//! This tool provides commands for:
//! - Simulating the campaign and funding flow end to end (dispatch, fold,
//!   settle, cross-contract claims)
//! - Inspecting and re-verifying attestation envelopes written by `simulate`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zkfund_contracts::{
    dispatch_claim, CampaignAction, CampaignContract, CampaignStatus, FundingAction,
    FundingContract, CAMPAIGN_ROLE, UNASSIGNED_ID,
};
use zkfund_fold::{
    Attestation, AttestationEnvelope, AttesterProofSystem, BatchProver, BatchProverConfig,
    Contract, MapStore, OpaqueEnvelope, ProofSystem, ReplayProofSystem,
};
use zkfund_primitives::{Digest, Identity};
use zkfund_settlement::{Controller, ControllerConfig, Peer, RoleTag, SettlementReceipt};

/// Proof system backing the simulation
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Transparent replay of the step transcript
    Replay,
    /// Keyed SHA-256 attester
    Attester,
}

/// zkfund - batched, attested crowdfunding state
#[derive(Parser)]
#[command(name = "zkfund")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate and inspect zkfund settlements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the campaign + funding flow and print the settled roots
    Simulate {
        /// Number of campaigns to create
        #[arg(short, long, default_value = "4")]
        campaigns: u64,

        /// Number of backers funding the campaigns
        #[arg(short, long, default_value = "16")]
        backers: u64,

        /// Actions folded per batch
        #[arg(long, default_value = "16")]
        batch_size: usize,

        /// Proof system
        #[arg(long, value_enum, default_value = "replay")]
        backend: Backend,

        /// Attester key passphrase (attester backend only)
        #[arg(long, default_value = "zkfund-dev")]
        secret: String,

        /// Controller configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the last funding attestation envelope here
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print an attestation envelope summary
    Inspect {
        /// Path to the envelope JSON
        file: PathBuf,

        /// Attester key passphrase, to verify attester envelopes
        #[arg(long)]
        secret: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            campaigns,
            backers,
            batch_size,
            backend,
            secret,
            config,
            out,
        } => {
            let config = match config {
                Some(path) => ControllerConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ControllerConfig::default(),
            };
            let options = SimulationOptions {
                campaigns,
                backers,
                batch_size,
                config,
                out,
            };
            match backend {
                Backend::Replay => simulate(ReplayProofSystem::new(), options),
                Backend::Attester => simulate(AttesterProofSystem::from_secret(&secret), options),
            }
        }

        Commands::Inspect { file, secret } => inspect(file, secret),
    }
}

struct SimulationOptions {
    campaigns: u64,
    backers: u64,
    batch_size: usize,
    config: ControllerConfig,
    out: Option<PathBuf>,
}

/// A controller together with the prover-side store tracking its maps
struct Deployment<C: Contract, P> {
    controller: Controller<C, P>,
    prover: BatchProver<C, P>,
    store: MapStore,
    batch_size: usize,
    batches: usize,
    last: Option<Attestation<C::Summary>>,
}

impl<C, P> Deployment<C, P>
where
    C: Contract + Clone,
    P: ProofSystem<C> + Clone,
{
    fn new(
        label: &str,
        contract: C,
        proofs: P,
        config: ControllerConfig,
        batch_size: usize,
        peers: &[(RoleTag, Identity)],
    ) -> Result<Self> {
        // flush before the pending limit can refuse a dispatch
        let batch_size = batch_size.min(config.max_pending_actions);
        if batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        let prover = BatchProver::with_config(
            contract.clone(),
            proofs.clone(),
            BatchProverConfig::default().with_max_batch_size(batch_size),
        );
        let controller = Controller::deploy_with_peers(
            Identity::named(label),
            contract.clone(),
            proofs,
            config,
            peers,
        )?;
        Ok(Self {
            controller,
            prover,
            store: MapStore::new(contract.layout())?,
            batch_size,
            batches: 0,
            last: None,
        })
    }

    /// Dispatch, settling first whenever a full batch is pending
    fn dispatch(&mut self, action: C::Action) -> Result<()> {
        if self.controller.pending_actions()?.len() >= self.batch_size {
            self.flush()?;
        }
        self.controller.dispatch(action)?;
        Ok(())
    }

    /// Fold and settle everything pending
    fn flush(&mut self) -> Result<Option<SettlementReceipt<C::Summary>>> {
        let pending = self.controller.pending_actions()?;
        if pending.is_empty() {
            return Ok(None);
        }
        let batch = self
            .prover
            .prove(&self.store, self.controller.committed_state(), &pending)
            .with_context(|| {
                format!("Failed to fold {} batch", self.controller.contract().name())
            })?;
        let receipt = self.controller.settle(&batch.attestation)?;

        self.batches += 1;
        println!(
            "  [{}] batch {}: {} actions, {} ms, proof {} bytes",
            self.controller.contract().name(),
            self.batches,
            batch.metadata.num_actions,
            batch.metadata.proving_time_ms,
            batch.metadata.proof_size
        );
        self.store = batch.store;
        self.last = Some(batch.attestation);
        Ok(Some(receipt))
    }
}

fn simulate<P>(proofs: P, options: SimulationOptions) -> Result<()>
where
    P: ProofSystem<CampaignContract> + ProofSystem<FundingContract> + Clone,
{
    println!();
    println!("========================================");
    println!("  zkfund Simulation");
    println!("========================================");
    println!();
    println!("Configuration:");
    println!("  Campaigns: {}", options.campaigns);
    println!("  Backers: {}", options.backers);
    println!("  Batch size: {}", options.batch_size);
    println!();

    let started = Instant::now();
    let campaign_contract = CampaignContract {
        max_pending_per_owner: options.batch_size.max(1),
    };
    let mut campaigns = Deployment::new(
        "zkfund/campaigns",
        campaign_contract,
        proofs.clone(),
        options.config.clone(),
        options.batch_size,
        &[],
    )?;
    let mut funding = Deployment::new(
        "zkfund/funding",
        FundingContract,
        proofs,
        options.config.clone(),
        options.batch_size,
        &[(CAMPAIGN_ROLE, campaigns.controller.identity())],
    )?;

    println!("Creating campaigns...");
    for i in 0..options.campaigns {
        campaigns.dispatch(CampaignAction::Create {
            id: UNASSIGNED_ID,
            metadata: Digest::hash_elements(&zkfund_primitives::felts_from_bytes(
                format!("campaign-{i}").as_bytes(),
            )),
            owner: owner(i),
            committee: Digest::from_u64s([i + 1, 0, 0, 0]),
        })?;
    }
    campaigns.flush()?;
    for campaign_id in 0..options.campaigns {
        campaigns.dispatch(CampaignAction::SetStatus {
            campaign_id,
            from: CampaignStatus::Created,
            to: CampaignStatus::Active,
        })?;
    }
    campaigns.flush()?;

    println!("Funding...");
    if options.campaigns > 0 {
        for backer in 0..options.backers {
            funding.dispatch(FundingAction::Fund {
                campaign_id: backer % options.campaigns,
                amount: 10 + (backer * 37) % 90,
            })?;
        }
    }
    funding.flush()?;

    println!("Claiming...");
    let registry_witness = funding.controller.registry_witness(CAMPAIGN_ROLE)?;
    for campaign_id in 0..options.campaigns.min(options.backers) {
        let owner_witness = campaigns
            .store
            .tree(zkfund_contracts::campaign::OWNERS)?
            .witness(campaign_id)?;
        let capability = funding.controller.resolve_peer(
            CAMPAIGN_ROLE,
            &campaigns.controller,
            &registry_witness,
        )?;
        dispatch_claim(
            &mut funding.controller,
            &capability,
            &owner_witness,
            campaign_id,
            owner(campaign_id),
        )?;
        if funding.controller.pending_actions()?.len() >= funding.batch_size {
            funding.flush()?;
        }
    }
    funding.flush()?;

    println!();
    println!("Settled state:");
    print_roots("campaign", &campaigns.controller);
    print_roots("funding", &funding.controller);
    if let Some(attestation) = &funding.last {
        let summary = attestation.summary();
        println!(
            "  last funding batch: {} contributions ({}), {} claims ({})",
            summary.contributions, summary.total_funded, summary.claims, summary.total_claimed
        );
    }
    println!("  elapsed: {:?}", started.elapsed());

    if let Some(path) = options.out {
        let Some(attestation) = funding.last.take() else {
            bail!("No funding batch was settled; nothing to write");
        };
        let envelope = AttestationEnvelope::new(FundingContract.name(), attestation);
        fs::write(&path, envelope.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Envelope written to: {}", path.display());
    }

    info!(
        campaign_batches = campaigns.batches,
        funding_batches = funding.batches,
        "simulation complete"
    );
    Ok(())
}

fn owner(campaign_id: u64) -> Identity {
    Identity::named(&format!("owner-{campaign_id}"))
}

fn print_roots<C: Contract, P: ProofSystem<C>>(label: &str, controller: &Controller<C, P>) {
    println!("  {label}:");
    println!("    action state: {}", controller.current_action_state());
    for (spec, root) in controller
        .contract()
        .layout()
        .iter()
        .zip(controller.current_map_roots().as_slice())
    {
        println!("    {:<12} {}", spec.name, root.to_hex());
    }
}

fn inspect(path: PathBuf, secret: Option<String>) -> Result<()> {
    let json = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let envelope = OpaqueEnvelope::from_json(&json)?;
    let attestation = &envelope.attestation;

    println!("Attestation Inspection:");
    println!("  Version: {}", envelope.version);
    println!("  Contract: {}", envelope.contract);
    println!("  Proof System: {}", attestation.proof.system);
    println!("  Proof Hash: {}", envelope.proof_hash);
    println!("  Proof Size: {} bytes", attestation.proof.len());
    println!("  Actions: {}", attestation.num_actions());
    println!("  Initial Action State: {}", attestation.initial().actions);
    println!("  Final Action State: {}", attestation.final_state().actions);
    for (i, root) in attestation.final_state().roots.as_slice().iter().enumerate() {
        println!("  Final Root #{}: {}", i, root.to_hex());
    }
    println!("  Summary: {}", attestation.summary());

    let system = attestation.proof.system.as_str();
    let verdict = match (envelope.contract.as_str(), system, secret) {
        ("campaign", "replay", _) => Some(verify_envelope(
            &json,
            &CampaignContract::default(),
            &ReplayProofSystem::new(),
        )),
        ("funding", "replay", _) => Some(verify_envelope(
            &json,
            &FundingContract,
            &ReplayProofSystem::new(),
        )),
        ("campaign", "attester", Some(secret)) => Some(verify_envelope(
            &json,
            &CampaignContract::default(),
            &AttesterProofSystem::from_secret(&secret),
        )),
        ("funding", "attester", Some(secret)) => Some(verify_envelope(
            &json,
            &FundingContract,
            &AttesterProofSystem::from_secret(&secret),
        )),
        _ => None,
    };

    match verdict {
        Some(Ok(())) => println!("  Verification: VALID"),
        Some(Err(e)) => println!("  Verification: INVALID ({e})"),
        None => println!("  Verification: skipped"),
    }
    Ok(())
}

fn verify_envelope<C, P>(json: &str, contract: &C, proofs: &P) -> Result<()>
where
    C: Contract,
    P: ProofSystem<C>,
{
    let envelope = AttestationEnvelope::<C::Summary>::from_json(json)?;
    proofs.verify(contract, &envelope.attestation)?;
    Ok(())
}
