//! Declarative mix graph
//!
//! A narration is rendered by describing nodes and connections up front,
//! validating the topology, and then evaluating it offline into a stereo
//! buffer. The default topology is:
//!
//! ```text
//! Source ──► Gain(dry) ──────────────► StereoPanner ──► Destination
//!    └─────► Convolver ──► Gain(wet) ──────┘
//! ```

use super::buffer::AudioBuffer;
use super::convolve::{convolve, normalize_impulse};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MixNode {
    /// The decoded speech buffer.
    Source,
    Gain { gain: f32 },
    /// Convolution with the pre-loaded impulse response.
    Convolver,
    /// Equal-power stereo panner, `pan` in `[-1, 1]`.
    StereoPanner { pan: f32 },
    /// The output device.
    Destination,
}

impl MixNode {
    pub fn name(&self) -> &'static str {
        match self {
            MixNode::Source => "source",
            MixNode::Gain { .. } => "gain",
            MixNode::Convolver => "convolver",
            MixNode::StereoPanner { .. } => "stereo_panner",
            MixNode::Destination => "destination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

/// Parameters of the narration topology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixSettings {
    pub dry_gain: f32,
    pub wet_gain: f32,
    pub pan: f32,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            dry_gain: 0.6,
            wet_gain: 0.4,
            pan: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixGraph {
    nodes: Vec<MixNode>,
    connections: Vec<Connection>,
}

impl MixGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dry/wet narration topology.
    pub fn narration(settings: &MixSettings) -> Self {
        let mut graph = Self::new();
        let source = graph.add_node(MixNode::Source);
        let dry = graph.add_node(MixNode::Gain {
            gain: settings.dry_gain,
        });
        let convolver = graph.add_node(MixNode::Convolver);
        let wet = graph.add_node(MixNode::Gain {
            gain: settings.wet_gain,
        });
        let panner = graph.add_node(MixNode::StereoPanner { pan: settings.pan });
        let destination = graph.add_node(MixNode::Destination);

        graph.connect(source, dry);
        graph.connect(dry, panner);
        graph.connect(source, convolver);
        graph.connect(convolver, wet);
        graph.connect(wet, panner);
        graph.connect(panner, destination);
        graph
    }

    pub fn add_node(&mut self, node: MixNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.connections.push(Connection { from, to });
    }

    pub fn nodes(&self) -> &[MixNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn inputs(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.connections
            .iter()
            .filter(move |c| c.to == id)
            .map(|c| c.from)
    }

    fn find(&self, wanted: fn(&MixNode) -> bool) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| wanted(n))
            .map(|(i, _)| i)
            .collect()
    }

    /// Check the topology and parameters, returning nodes in evaluation order.
    pub fn validate(&self) -> Result<Vec<NodeId>, DomainError> {
        let invalid = |msg: String| DomainError::InvalidGraph(msg);

        let sources = self.find(|n| matches!(n, MixNode::Source));
        let destinations = self.find(|n| matches!(n, MixNode::Destination));
        if sources.len() != 1 {
            return Err(invalid(format!("expected one source, found {}", sources.len())));
        }
        if destinations.len() != 1 {
            return Err(invalid(format!(
                "expected one destination, found {}",
                destinations.len()
            )));
        }

        for c in &self.connections {
            if c.from >= self.nodes.len() || c.to >= self.nodes.len() {
                return Err(invalid(format!(
                    "connection {} -> {} references a missing node",
                    c.from, c.to
                )));
            }
            if c.from == c.to {
                return Err(invalid(format!("node {} is connected to itself", c.from)));
            }
        }

        for (id, node) in self.nodes.iter().enumerate() {
            let has_input = self.connections.iter().any(|c| c.to == id);
            let has_output = self.connections.iter().any(|c| c.from == id);
            match node {
                MixNode::Source if has_input => {
                    return Err(invalid("source cannot have inputs".into()));
                }
                MixNode::Destination if has_output => {
                    return Err(invalid("destination cannot have outputs".into()));
                }
                MixNode::Source | MixNode::Destination => {}
                _ if !has_input || !has_output => {
                    return Err(invalid(format!("{} node {id} is dangling", node.name())));
                }
                _ => {}
            }
            match *node {
                MixNode::Gain { gain } if !gain.is_finite() || gain < 0.0 => {
                    return Err(invalid(format!("gain {gain} out of range")));
                }
                MixNode::StereoPanner { pan } if !(-1.0..=1.0).contains(&pan) => {
                    return Err(invalid(format!("pan {pan} outside [-1, 1]")));
                }
                _ => {}
            }
        }

        if !self.connections.iter().any(|c| c.to == destinations[0]) {
            return Err(invalid("destination has no inputs".into()));
        }

        self.topological_order()
            .ok_or_else(|| invalid("graph contains a cycle".into()))
    }

    fn topological_order(&self) -> Option<Vec<NodeId>> {
        let mut in_degree = vec![0usize; self.nodes.len()];
        for c in &self.connections {
            in_degree[c.to] += 1;
        }
        let mut ready: VecDeque<NodeId> = (0..self.nodes.len())
            .filter(|id| in_degree[*id] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            for c in self.connections.iter().filter(|c| c.from == id) {
                in_degree[c.to] -= 1;
                if in_degree[c.to] == 0 {
                    ready.push_back(c.to);
                }
            }
        }

        (order.len() == self.nodes.len()).then_some(order)
    }

    /// Render `source` through the graph into an interleaved stereo buffer at
    /// the source's sample rate.
    pub fn render(
        &self,
        source: &AudioBuffer,
        impulse: &AudioBuffer,
    ) -> Result<AudioBuffer, DomainError> {
        let order = self.validate()?;
        let impulse = normalize_impulse(&impulse.mono_at_rate(source.sample_rate()));

        let mut outputs: Vec<Option<Vec<Vec<f32>>>> = vec![None; self.nodes.len()];
        let mut rendered = None;

        for id in order {
            let input = || {
                let incoming: Vec<&Vec<Vec<f32>>> = self
                    .inputs(id)
                    .filter_map(|from| outputs[from].as_ref())
                    .collect();
                sum_signals(&incoming)
            };

            let output = match self.nodes[id] {
                MixNode::Source => {
                    if source.channels() == 2 {
                        source.planes()
                    } else {
                        vec![source.to_mono()]
                    }
                }
                MixNode::Gain { gain } => input()
                    .into_iter()
                    .map(|plane| plane.into_iter().map(|s| s * gain).collect())
                    .collect(),
                MixNode::Convolver => input()
                    .iter()
                    .map(|plane| convolve(plane, &impulse))
                    .collect(),
                MixNode::StereoPanner { pan } => pan_equal_power(input(), pan),
                MixNode::Destination => {
                    rendered = Some(to_stereo(input()));
                    continue;
                }
            };
            outputs[id] = Some(output);
        }

        let [left, right] = rendered.unwrap_or_default();
        Ok(AudioBuffer::from_stereo_planes(
            source.sample_rate(),
            &left,
            &right,
        ))
    }
}

/// Sum signals sample-wise, up-mixing mono to stereo when channel counts
/// differ and padding shorter signals with silence.
fn sum_signals(signals: &[&Vec<Vec<f32>>]) -> Vec<Vec<f32>> {
    let channels = signals.iter().map(|s| s.len()).max().unwrap_or(1).max(1);
    let frames = signals
        .iter()
        .flat_map(|s| s.iter().map(Vec::len))
        .max()
        .unwrap_or(0);

    let mut mixed = vec![vec![0.0f32; frames]; channels];
    for signal in signals {
        for (ch, out) in mixed.iter_mut().enumerate() {
            let Some(plane) = signal.get(ch).or_else(|| signal.first()) else {
                continue;
            };
            for (o, s) in out.iter_mut().zip(plane) {
                *o += s;
            }
        }
    }
    mixed
}

/// Equal-power panning. Mono input is spread across both channels;
/// stereo input has the far channel folded into the near one.
fn pan_equal_power(input: Vec<Vec<f32>>, pan: f32) -> Vec<Vec<f32>> {
    let pan = pan.clamp(-1.0, 1.0);
    match <[Vec<f32>; 2]>::try_from(input) {
        Ok([left, right]) => {
            if pan <= 0.0 {
                let x = (pan + 1.0) * FRAC_PI_2;
                let (g_l, g_r) = (x.cos(), x.sin());
                let l = left.iter().zip(&right).map(|(l, r)| l + r * g_l).collect();
                let r = right.iter().map(|r| r * g_r).collect();
                vec![l, r]
            } else {
                let x = pan * FRAC_PI_2;
                let (g_l, g_r) = (x.cos(), x.sin());
                let l = left.iter().map(|l| l * g_l).collect();
                let r = right.iter().zip(&left).map(|(r, l)| r + l * g_r).collect();
                vec![l, r]
            }
        }
        Err(planes) => {
            let mono = planes.into_iter().next().unwrap_or_default();
            let x = (pan + 1.0) / 2.0 * FRAC_PI_2;
            let (g_l, g_r) = (x.cos(), x.sin());
            vec![
                mono.iter().map(|s| s * g_l).collect(),
                mono.iter().map(|s| s * g_r).collect(),
            ]
        }
    }
}

fn to_stereo(planes: Vec<Vec<f32>>) -> [Vec<f32>; 2] {
    let mut planes = planes.into_iter();
    let left = planes.next().unwrap_or_default();
    let right = planes.next().unwrap_or_else(|| left.clone());
    [left, right]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_narration_topology_is_valid() {
        let graph = MixGraph::narration(&MixSettings::default());
        let order = graph.validate().unwrap();
        assert_eq!(order.len(), 6);
        assert_eq!(graph.nodes()[order[0]], MixNode::Source);
        assert_eq!(graph.nodes()[*order.last().unwrap()], MixNode::Destination);
        assert!(graph.nodes().contains(&MixNode::Gain { gain: 0.6 }));
        assert!(graph.nodes().contains(&MixNode::Gain { gain: 0.4 }));
    }

    #[test]
    fn test_rejects_missing_destination() {
        let mut graph = MixGraph::new();
        let source = graph.add_node(MixNode::Source);
        let gain = graph.add_node(MixNode::Gain { gain: 1.0 });
        graph.connect(source, gain);
        assert!(matches!(graph.validate(), Err(DomainError::InvalidGraph(_))));
    }

    #[test]
    fn test_rejects_dangling_node() {
        let mut graph = MixGraph::new();
        let source = graph.add_node(MixNode::Source);
        let destination = graph.add_node(MixNode::Destination);
        graph.add_node(MixNode::Convolver);
        graph.connect(source, destination);
        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("dangling"));
    }

    #[test]
    fn test_rejects_cycle() {
        let mut graph = MixGraph::new();
        let source = graph.add_node(MixNode::Source);
        let a = graph.add_node(MixNode::Gain { gain: 1.0 });
        let b = graph.add_node(MixNode::Gain { gain: 1.0 });
        let destination = graph.add_node(MixNode::Destination);
        graph.connect(source, a);
        graph.connect(a, b);
        graph.connect(b, a);
        graph.connect(b, destination);
        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_rejects_out_of_range_parameters() {
        let graph = MixGraph::narration(&MixSettings {
            pan: 1.5,
            ..MixSettings::default()
        });
        assert!(graph.validate().is_err());

        let graph = MixGraph::narration(&MixSettings {
            dry_gain: -0.1,
            ..MixSettings::default()
        });
        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_render_dry_wet_mix_with_unit_impulse() {
        // A unit impulse makes the wet path a copy of the input, so the
        // panner sees (0.6 + 0.4) * x and spreads it at equal power.
        let graph = MixGraph::narration(&MixSettings::default());
        let source = AudioBuffer::mono(8_000, vec![1.0, 0.5]);
        let impulse = AudioBuffer::mono(8_000, vec![1.0]);

        let out = graph.render(&source, &impulse).unwrap();
        assert_eq!(out.channels(), 2);
        assert_eq!(out.frames(), 2);
        let s = out.samples();
        assert!(close(s[0], FRAC_1_SQRT_2));
        assert!(close(s[1], FRAC_1_SQRT_2));
        assert!(close(s[2], 0.5 * FRAC_1_SQRT_2));
    }

    #[test]
    fn test_reverb_tail_extends_output() {
        let graph = MixGraph::narration(&MixSettings::default());
        let source = AudioBuffer::mono(8_000, vec![1.0]);
        let impulse = AudioBuffer::mono(8_000, vec![0.0, 0.0, 1.0]);

        let out = graph.render(&source, &impulse).unwrap();
        assert_eq!(out.frames(), 3);
        let left = &out.planes()[0];
        assert!(close(left[0], 0.6 * FRAC_1_SQRT_2));
        assert!(close(left[1], 0.0));
        assert!(close(left[2], 0.4 * FRAC_1_SQRT_2));
    }

    #[test]
    fn test_hard_pan_left() {
        let panned = pan_equal_power(vec![vec![1.0]], -1.0);
        assert!(close(panned[0][0], 1.0));
        assert!(close(panned[1][0], 0.0));
    }

    #[test]
    fn test_stereo_pan_right_folds_left_channel() {
        let panned = pan_equal_power(vec![vec![1.0], vec![0.0]], 1.0);
        assert!(close(panned[0][0], 0.0));
        assert!(close(panned[1][0], 1.0));
    }

    #[test]
    fn test_sum_upmixes_mono() {
        let mono = vec![vec![1.0, 1.0]];
        let stereo = vec![vec![0.5], vec![0.25]];
        let mixed = sum_signals(&[&mono, &stereo]);
        assert_eq!(mixed, vec![vec![1.5, 1.0], vec![1.25, 1.0]]);
    }
}
