use super::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolParameters {
    pub protocol_version: u8,
    pub network_id: u64,
    pub min_pow_score: f64,
    pub max_inputs: usize,
    pub max_outputs: usize,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            protocol_version: 2,
            network_id: 0x5350_414d,
            min_pow_score: 1.0,
            max_inputs: 128,
            max_outputs: 128,
        }
    }
}
