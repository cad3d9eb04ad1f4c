use serde::{Deserialize, Serialize};

use crate::coin::{validate_denom, Coin};
use crate::constants::{ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, PROPOSAL_ROUTE_PREFIX};
use crate::error::GravityError;
use crate::types::{AccAddress, ChainId, EventNonce};

// ── Proposal kinds ───────────────────────────────────────────────────────────

/// Every governance proposal type the gravity module registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProposalKind {
    UnhaltBridge,
    Airdrop,
    IbcMetadata,
}

impl ProposalKind {
    pub const ALL: [ProposalKind; 3] = [
        ProposalKind::IbcMetadata,
        ProposalKind::UnhaltBridge,
        ProposalKind::Airdrop,
    ];

    /// Full route name, e.g. `gravity/Airdrop`.
    pub fn route(&self) -> &'static str {
        match self {
            ProposalKind::UnhaltBridge => "gravity/UnhaltBridge",
            ProposalKind::Airdrop => "gravity/Airdrop",
            ProposalKind::IbcMetadata => "gravity/IBCMetadata",
        }
    }

    /// Registry key: the route with the module prefix stripped. Deriving it
    /// from `route()` keeps the checked and the registered names identical.
    pub fn type_name(&self) -> &'static str {
        let route = self.route();
        route.strip_prefix(PROPOSAL_ROUTE_PREFIX).unwrap_or(route)
    }

    pub fn from_route(route: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.route() == route)
    }
}

// ── Content validation ───────────────────────────────────────────────────────

fn validate_text(title: &str, description: &str) -> Result<(), GravityError> {
    if title.trim().is_empty() {
        return Err(GravityError::InvalidProposal("proposal title cannot be blank".into()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(GravityError::InvalidProposal(format!(
            "proposal title is longer than max length of {MAX_TITLE_LEN}"
        )));
    }
    if description.trim().is_empty() {
        return Err(GravityError::InvalidProposal("proposal description cannot be blank".into()));
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(GravityError::InvalidProposal(format!(
            "proposal description is longer than max length of {MAX_DESCRIPTION_LEN}"
        )));
    }
    Ok(())
}

// ── UnhaltBridge ─────────────────────────────────────────────────────────────

/// Roll oracle history for `chain_id` back to `target_nonce`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnhaltBridgeProposal {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_nonce: EventNonce,
    pub chain_id: ChainId,
}

impl UnhaltBridgeProposal {
    pub fn validate_basic(&self) -> Result<(), GravityError> {
        validate_text(&self.title, &self.description)?;
        if self.target_nonce == 0 {
            return Err(GravityError::InvalidProposal("target nonce must be positive".into()));
        }
        Ok(())
    }
}

// ── Airdrop ──────────────────────────────────────────────────────────────────

/// On-chain airdrop form: recipients packed as raw 20-byte addresses to keep
/// large lists small.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropProposal {
    pub title: String,
    pub description: String,
    pub denom: String,
    #[serde(with = "hex::serde")]
    pub recipients: Vec<u8>,
    pub amounts: Vec<u64>,
}

impl AirdropProposal {
    pub fn validate_basic(&self) -> Result<(), GravityError> {
        validate_text(&self.title, &self.description)?;
        validate_denom(&self.denom)?;
        if self.recipients.len() % ADDRESS_LEN != 0
            || self.recipients.len() / ADDRESS_LEN != self.amounts.len()
        {
            return Err(GravityError::InvalidRecipients {
                len: self.recipients.len(),
                amounts: self.amounts.len(),
                width: ADDRESS_LEN,
            });
        }
        Ok(())
    }
}

/// Human-authored airdrop proposal as written in a proposal JSON file.
/// Keys follow the file format (`Title`, `Recipients`, ...); lowercase keys
/// are accepted as well.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AirdropProposalPlain {
    #[serde(alias = "title")]
    pub title: String,
    #[serde(alias = "description")]
    pub description: String,
    #[serde(alias = "denom")]
    pub denom: String,
    #[serde(alias = "recipients")]
    pub recipients: Vec<String>,
    #[serde(alias = "amounts")]
    pub amounts: Vec<u64>,
}

impl AirdropProposalPlain {
    /// Converts to the packed on-chain form. Any recipient that is not a valid
    /// account address aborts the conversion.
    pub fn into_proposal(self) -> Result<AirdropProposal, GravityError> {
        let recipients = encode_recipients(&self.recipients)?;
        Ok(AirdropProposal {
            title: self.title,
            description: self.description,
            denom: self.denom,
            recipients,
            amounts: self.amounts,
        })
    }
}

/// Concatenate the raw bytes of each bech32 account address.
pub fn encode_recipients<S: AsRef<str>>(recipients: &[S]) -> Result<Vec<u8>, GravityError> {
    let mut packed = Vec::with_capacity(recipients.len() * ADDRESS_LEN);
    for r in recipients {
        let addr = AccAddress::from_bech32(r.as_ref())?;
        packed.extend_from_slice(addr.as_bytes());
    }
    Ok(packed)
}

/// Split a packed buffer back into addresses, in order.
pub fn decode_recipients(packed: &[u8]) -> Result<Vec<AccAddress>, GravityError> {
    if packed.len() % ADDRESS_LEN != 0 {
        return Err(GravityError::MalformedPayload(format!(
            "recipient buffer of {} bytes is not a multiple of {ADDRESS_LEN}",
            packed.len()
        )));
    }
    packed.chunks_exact(ADDRESS_LEN).map(AccAddress::from_slice).collect()
}

// ── Dispatchable content ─────────────────────────────────────────────────────

/// Wire form of proposal content: a type URL plus its JSON body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalContent {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub value: serde_json::Value,
}

/// The closed set of proposals the gravity handler executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GravityProposal {
    UnhaltBridge(UnhaltBridgeProposal),
    Airdrop(AirdropProposal),
}

impl GravityProposal {
    pub fn kind(&self) -> ProposalKind {
        match self {
            GravityProposal::UnhaltBridge(_) => ProposalKind::UnhaltBridge,
            GravityProposal::Airdrop(_) => ProposalKind::Airdrop,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            GravityProposal::UnhaltBridge(p) => &p.title,
            GravityProposal::Airdrop(p) => &p.title,
        }
    }

    pub fn validate_basic(&self) -> Result<(), GravityError> {
        match self {
            GravityProposal::UnhaltBridge(p) => p.validate_basic(),
            GravityProposal::Airdrop(p) => p.validate_basic(),
        }
    }

    pub fn to_content(&self) -> Result<ProposalContent, GravityError> {
        let value = match self {
            GravityProposal::UnhaltBridge(p) => serde_json::to_value(p),
            GravityProposal::Airdrop(p) => serde_json::to_value(p),
        }
        .map_err(|e| GravityError::Serialization(e.to_string()))?;
        Ok(ProposalContent {
            type_url: self.kind().route().to_string(),
            value,
        })
    }

    /// Decode wire content. Type URLs this handler does not execute yield
    /// `UnknownProposalType`.
    pub fn from_content(content: &ProposalContent) -> Result<Self, GravityError> {
        let malformed = |e: serde_json::Error| GravityError::MalformedPayload(e.to_string());
        match ProposalKind::from_route(&content.type_url) {
            Some(ProposalKind::UnhaltBridge) => serde_json::from_value(content.value.clone())
                .map(GravityProposal::UnhaltBridge)
                .map_err(malformed),
            Some(ProposalKind::Airdrop) => serde_json::from_value(content.value.clone())
                .map(GravityProposal::Airdrop)
                .map_err(malformed),
            Some(ProposalKind::IbcMetadata) | None => {
                Err(GravityError::UnknownProposalType(content.type_url.clone()))
            }
        }
    }
}

// ── MsgSubmitProposal ────────────────────────────────────────────────────────

/// Governance submission message produced by the authoring CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MsgSubmitProposal {
    pub proposer: String,
    pub initial_deposit: Vec<Coin>,
    pub content: ProposalContent,
}

impl MsgSubmitProposal {
    /// Stateless checks. `is_registered` answers whether a proposal type name
    /// (route without module prefix) has been registered with governance.
    pub fn validate_basic<F>(&self, is_registered: F) -> Result<GravityProposal, GravityError>
    where
        F: Fn(&str) -> bool,
    {
        AccAddress::from_bech32(&self.proposer)?;
        let [deposit] = self.initial_deposit.as_slice() else {
            return Err(GravityError::NotSingleCoin {
                what: "initial deposit",
                got: self.initial_deposit.len(),
            });
        };
        deposit.validate()?;
        if deposit.amount == 0 {
            return Err(GravityError::InvalidCoin(deposit.to_string()));
        }
        let kind = ProposalKind::from_route(&self.content.type_url)
            .ok_or_else(|| GravityError::UnknownProposalType(self.content.type_url.clone()))?;
        if !is_registered(kind.type_name()) {
            return Err(GravityError::UnknownProposalType(self.content.type_url.clone()));
        }
        let proposal = GravityProposal::from_content(&self.content)?;
        proposal.validate_basic()?;
        Ok(proposal)
    }
}
