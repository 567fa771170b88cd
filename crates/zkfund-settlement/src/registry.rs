//! Cross-contract references
//!
//! Each controller keeps a small registry map from role tags to the digest
//! of the peer identity allowed to play that role. A peer is usable only
//! through a `PeerCapability`, which exists only after the registry check
//! passed for the right role.

use std::fmt;

use serde::{Deserialize, Serialize};
use zkfund_fold::{AuthMap, Contract, FoldResult, MapId, MapKey, MapWitness};
use zkfund_primitives::{Digest, Identity};

use crate::error::{SettlementError, SettlementResult};

/// Height of every controller's registry map
pub const REGISTRY_HEIGHT: u8 = 8;

/// Slot of a role in the registry map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleTag(pub u64);

impl MapKey for RoleTag {
    fn to_index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role:{}", self.0)
    }
}

/// Anything that can be referenced from another contract
pub trait Peer {
    fn identity(&self) -> Identity;
}

/// Role-tag -> peer-identity map
#[derive(Debug, Clone)]
pub struct PeerRegistry {
    map: AuthMap<RoleTag, Identity>,
}

impl PeerRegistry {
    pub fn new() -> FoldResult<Self> {
        Ok(Self {
            map: AuthMap::new(MapId(0), REGISTRY_HEIGHT)?,
        })
    }

    pub fn root(&self) -> Digest {
        self.map.root()
    }

    /// Bind `identity` to `role`, replacing any previous binding
    pub fn register(&mut self, role: RoleTag, identity: &Identity) -> FoldResult<Digest> {
        self.map.insert(&role, identity)?;
        Ok(self.map.root())
    }

    /// Digest stored for `role`, zero when unbound
    pub fn binding(&self, role: RoleTag) -> FoldResult<Digest> {
        self.map.leaf(&role)
    }

    pub fn witness(&self, role: RoleTag) -> FoldResult<MapWitness> {
        self.map.witness(&role)
    }
}

/// A peer that passed registry validation for `role` against `registry`
pub struct PeerCapability<'a, T> {
    peer: &'a T,
    role: RoleTag,
    registry: Digest,
}

impl<'a, T> PeerCapability<'a, T> {
    pub fn peer(&self) -> &'a T {
        self.peer
    }

    pub fn role(&self) -> RoleTag {
        self.role
    }

    /// Registry root the capability was validated against
    pub fn registry_root(&self) -> Digest {
        self.registry
    }
}

impl<T: Peer> fmt::Debug for PeerCapability<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerCapability")
            .field("peer", &self.peer.identity())
            .field("role", &self.role)
            .field("registry", &self.registry)
            .finish()
    }
}

/// A contract with actions that only a registered peer can vouch for
///
/// The controller resolves the capability against its own registry and the
/// contract's role before `authorize` sees the peer.
pub trait ReferenceCheck<T: Peer>: Contract {
    /// Extra material the peer view needs, typically a witness into its maps
    type Evidence: ?Sized;

    /// Role the peer must be registered under
    fn peer_role(&self) -> RoleTag;

    /// Decide from the peer's committed state whether `action` may be logged
    fn authorize(
        &self,
        peer: &T,
        action: &Self::Action,
        evidence: &Self::Evidence,
    ) -> SettlementResult<()>;
}

/// Check `peer` against `registry_root` under `role`
///
/// Both conditions must hold: the witness speaks for the role's slot, and the
/// slot holds the digest of the peer's identity.
pub fn validate_peer<'a, T: Peer>(
    registry_root: &Digest,
    role: RoleTag,
    peer: &'a T,
    witness: &MapWitness,
) -> SettlementResult<PeerCapability<'a, T>> {
    if witness.index() != role.to_index() {
        return Err(SettlementError::RoleMismatch {
            expected: role,
            actual: witness.index(),
        });
    }
    if !witness.verify_old(registry_root, &peer.identity().digest()) {
        return Err(SettlementError::UnregisteredPeer { role });
    }
    Ok(PeerCapability {
        peer,
        role,
        registry: *registry_root,
    })
}
