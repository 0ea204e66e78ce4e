//! Social evidence sources.
//!
//! Each source produces one binary "public comment" and applies it as an
//! update to the acting agent. The two poll variants build a transient
//! sub-population of fresh agents, let a random member speak each round,
//! and update every member with what was said.

use crate::belief::BeliefAgent;
use crate::error::ModelError;
use crate::params::SampledPriors;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// Probability that the expert's comment is `true`.
pub const EXPERT_TRUTH_RATE: f64 = 0.7;

/// Evidence-gathering action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// Ask a class of peers (code 1)
    Peer,

    /// Attend a conference (code 2)
    Conference,

    /// Consult an expert (code 3)
    Expert,
}

impl EvidenceKind {
    /// All kinds in code order.
    pub const ALL: [EvidenceKind; 3] =
        [EvidenceKind::Peer, EvidenceKind::Conference, EvidenceKind::Expert];

    /// Numeric code used in exported sequences.
    pub fn code(&self) -> u8 {
        match self {
            EvidenceKind::Peer => 1,
            EvidenceKind::Conference => 2,
            EvidenceKind::Expert => 3,
        }
    }

    /// Picks one kind uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvidenceKind::Peer => "peer",
            EvidenceKind::Conference => "conference",
            EvidenceKind::Expert => "expert",
        }
    }

    /// Likelihood handed to updates triggered by this source.
    ///
    /// Peers speak with the base reliability, conference attendees with one
    /// bonus on top, the expert with two.
    pub fn likelihood(&self, priors: &SampledPriors) -> f64 {
        match self {
            EvidenceKind::Peer => priors.base,
            EvidenceKind::Conference => priors.base + priors.bonus,
            EvidenceKind::Expert => priors.base + priors.bonus * 2.0,
        }
    }
}

impl std::fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the speaker of a poll round is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerSelection {
    /// Uniform Fisher-Yates shuffle
    #[default]
    Uniform,

    /// Biased swap loop drawing `j` from `[0, i)` instead of
    /// `[0, i]`. This is Sattolo's algorithm: it only yields cyclic
    /// permutations, so the previous first member never speaks twice in a row.
    LegacyPartialSwap,
}

impl SpeakerSelection {
    pub fn shuffle<T, R: Rng + ?Sized>(&self, members: &mut [T], rng: &mut R) {
        match self {
            SpeakerSelection::Uniform => members.shuffle(rng),
            SpeakerSelection::LegacyPartialSwap => {
                for i in (1..members.len()).rev() {
                    let j = rng.gen_range(0..i);
                    members.swap(i, j);
                }
            }
        }
    }
}

/// Shape of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Sub-population size
    pub members: usize,

    /// Number of speak-and-update rounds
    pub rounds: usize,
}

impl PollConfig {
    /// A class of peers.
    pub const PEER: PollConfig = PollConfig { members: 60, rounds: 10 };

    /// A conference audience.
    pub const CONFERENCE: PollConfig = PollConfig { members: 25, rounds: 5 };
}

/// Poll block as written in a config file; absent fields keep the base value.
#[derive(Debug, Deserialize)]
struct PollOverride {
    members: Option<usize>,
    rounds: Option<usize>,
}

impl PollOverride {
    fn over(self, base: PollConfig) -> PollConfig {
        PollConfig {
            members: self.members.unwrap_or(base.members),
            rounds: self.rounds.unwrap_or(base.rounds),
        }
    }
}

fn peer_poll<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PollConfig, D::Error> {
    Ok(PollOverride::deserialize(deserializer)?.over(PollConfig::PEER))
}

fn conference_poll<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PollConfig, D::Error> {
    Ok(PollOverride::deserialize(deserializer)?.over(PollConfig::CONFERENCE))
}

/// Configuration for all three sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    #[serde(deserialize_with = "peer_poll")]
    pub peer: PollConfig,

    #[serde(deserialize_with = "conference_poll")]
    pub conference: PollConfig,

    /// Probability that the expert says `true`
    pub expert_truth_rate: f64,

    pub speaker_selection: SpeakerSelection,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            peer: PollConfig::PEER,
            conference: PollConfig::CONFERENCE,
            expert_truth_rate: EXPERT_TRUTH_RATE,
            speaker_selection: SpeakerSelection::Uniform,
        }
    }
}

impl EvidenceConfig {
    pub fn with_speaker_selection(mut self, selection: SpeakerSelection) -> Self {
        self.speaker_selection = selection;
        self
    }

    pub fn with_expert_truth_rate(mut self, rate: f64) -> Self {
        self.expert_truth_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if !(0.0..=1.0).contains(&self.expert_truth_rate) {
            return Err(ModelError::invalid(format!(
                "expert truth rate {} outside [0, 1]",
                self.expert_truth_rate
            )));
        }
        Ok(())
    }
}

/// Dispatches one trial to the matching source.
pub fn gather<R: Rng + ?Sized>(
    kind: EvidenceKind,
    agent: &mut BeliefAgent,
    priors: &SampledPriors,
    config: &EvidenceConfig,
    rng: &mut R,
) {
    match kind {
        EvidenceKind::Peer => ask_peers(agent, priors, config, rng),
        EvidenceKind::Conference => attend_conference(agent, priors, config, rng),
        EvidenceKind::Expert => {
            let likelihood = kind.likelihood(priors);
            consult_expert(agent, likelihood, config.expert_truth_rate, rng)
        }
    }
}

/// Asks a class of peers.
pub fn ask_peers<R: Rng + ?Sized>(
    agent: &mut BeliefAgent,
    priors: &SampledPriors,
    config: &EvidenceConfig,
    rng: &mut R,
) {
    let likelihood = EvidenceKind::Peer.likelihood(priors);
    run_poll(agent, likelihood, config.peer, config.speaker_selection, rng);
}

/// Attends a conference of better-informed attendees.
pub fn attend_conference<R: Rng + ?Sized>(
    agent: &mut BeliefAgent,
    priors: &SampledPriors,
    config: &EvidenceConfig,
    rng: &mut R,
) {
    let likelihood = EvidenceKind::Conference.likelihood(priors);
    run_poll(agent, likelihood, config.conference, config.speaker_selection, rng);
}

/// Flips the expert's weighted coin and updates once.
pub fn consult_expert<R: Rng + ?Sized>(
    agent: &mut BeliefAgent,
    likelihood: f64,
    truth_rate: f64,
    rng: &mut R,
) {
    let comment = rng.gen::<f64>() < truth_rate;
    agent.update(comment, likelihood);
}

/// Runs a poll of fresh members that all share `reliability`.
///
/// Member credences are uniform in `[0, 1)`. Every round the shuffled
/// sub-population's first member speaks; the acting agent and every member
/// then update on that comment with `reliability` as the likelihood.
pub fn run_poll<R: Rng + ?Sized>(
    agent: &mut BeliefAgent,
    reliability: f64,
    poll: PollConfig,
    selection: SpeakerSelection,
    rng: &mut R,
) {
    let mut members: Vec<BeliefAgent> = (0..poll.members)
        .map(|_| {
            let credence = rng.gen::<f64>();
            BeliefAgent::new(reliability, credence, rng)
        })
        .collect();

    for _ in 0..poll.rounds {
        selection.shuffle(&mut members, rng);
        let Some(speaker) = members.first() else {
            return;
        };
        let comment = speaker.belief();

        agent.update(comment, reliability);
        for member in members.iter_mut() {
            member.update(comment, reliability);
        }
    }
}
