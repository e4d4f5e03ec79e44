//! Config → prover settings

use umbra_config::{HashingToml, UmbraConfig};
use umbra_prover::{HashingScheme, NargoConfig, ProofOptions};

pub fn nargo_config(config: &UmbraConfig) -> NargoConfig {
    NargoConfig {
        circuits_dir: config.circuits.dir.clone(),
        nargo_bin: config.backend.nargo_bin.clone(),
        bb_bin: config.backend.bb_bin.clone(),
        deposit_package: config.circuits.deposit_package.clone(),
        withdraw_package: config.circuits.withdraw_package.clone(),
        transfer_package: config.circuits.transfer_package.clone(),
    }
}

pub fn proof_options(config: &UmbraConfig) -> ProofOptions {
    let hashing = match config.backend.hashing {
        HashingToml::Keccak => HashingScheme::Keccak,
        HashingToml::Poseidon2 => HashingScheme::Poseidon2,
    };
    ProofOptions { hashing }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_line_up() {
        let config = UmbraConfig::default();
        assert_eq!(nargo_config(&config), NargoConfig::default());
        assert_eq!(proof_options(&config), ProofOptions::default());
    }

    #[test]
    fn test_overrides_carry_through() {
        let mut config = UmbraConfig::default();
        config.circuits.dir = PathBuf::from("/opt/circuits");
        config.backend.hashing = HashingToml::Poseidon2;
        let nargo = nargo_config(&config);
        assert_eq!(nargo.circuits_dir, PathBuf::from("/opt/circuits"));
        assert_eq!(proof_options(&config).hashing, HashingScheme::Poseidon2);
    }
}
