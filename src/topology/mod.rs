//! 流水线拓扑图
//!
//! 拓扑固定为 Problem → CEO → Researcher → Coder → Critic，与任何一次运行的内容无关，
//! 每次渲染都重新构建。

use std::io::Write;
use std::path::{Path, PathBuf};

use petgraph::algo::toposort;
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::pipeline::Stage;

const NODE_RADIUS: u32 = 46;
const NODE_SPACING: u32 = 150;
const MARGIN: u32 = 20;
const NODE_COLOR: &str = "#90caf9";

/// 拓扑图中的节点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyNode {
    Problem,
    Stage(Stage),
}

impl std::fmt::Display for TopologyNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyNode::Problem => write!(f, "Problem"),
            TopologyNode::Stage(stage) => write!(f, "{}", stage),
        }
    }
}

/// 固定的流水线拓扑
pub struct Topology {
    graph: DiGraph<TopologyNode, &'static str>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl Topology {
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let mut previous = graph.add_node(TopologyNode::Problem);
        for stage in Stage::ALL {
            let node = graph.add_node(TopologyNode::Stage(stage));
            graph.add_edge(previous, node, "");
            previous = node;
        }
        Self { graph }
    }

    /// 按依赖顺序排列的节点
    pub fn nodes(&self) -> Vec<TopologyNode> {
        self.ordered_indices()
            .into_iter()
            .map(|index| self.graph[index])
            .collect()
    }

    pub fn edges(&self) -> Vec<(TopologyNode, TopologyNode)> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .map(|(from, to)| (self.graph[from], self.graph[to]))
            .collect()
    }

    /// Graphviz DOT格式
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[DotConfig::EdgeNoLabel]))
    }

    /// 横向排布的SVG图
    pub fn to_svg(&self) -> String {
        let order = self.ordered_indices();
        let width = MARGIN * 2 + NODE_SPACING * (order.len().saturating_sub(1) as u32) + NODE_RADIUS * 2;
        let height = MARGIN * 2 + NODE_RADIUS * 2;
        let cy = MARGIN + NODE_RADIUS;
        let cx = |position: usize| MARGIN + NODE_RADIUS + NODE_SPACING * position as u32;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
        ));
        svg.push_str(
            "  <defs>\n    <marker id=\"arrow\" markerWidth=\"10\" markerHeight=\"10\" refX=\"9\" refY=\"5\" orient=\"auto\">\n      <path d=\"M0,0 L10,5 L0,10 z\" fill=\"#333\"/>\n    </marker>\n  </defs>\n",
        );

        for (from, to) in self
            .graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
        {
            let (Some(from_pos), Some(to_pos)) = (
                order.iter().position(|i| *i == from),
                order.iter().position(|i| *i == to),
            ) else {
                continue;
            };
            svg.push_str(&format!(
                "  <line x1=\"{}\" y1=\"{cy}\" x2=\"{}\" y2=\"{cy}\" stroke=\"#333\" stroke-width=\"2\" marker-end=\"url(#arrow)\"/>\n",
                cx(from_pos) + NODE_RADIUS,
                cx(to_pos) - NODE_RADIUS,
            ));
        }

        for (position, index) in order.iter().enumerate() {
            svg.push_str(&format!(
                "  <circle cx=\"{}\" cy=\"{cy}\" r=\"{NODE_RADIUS}\" fill=\"{NODE_COLOR}\"/>\n",
                cx(position)
            ));
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"12\" font-weight=\"bold\" text-anchor=\"middle\">{}</text>\n",
                cx(position),
                cy + 4,
                self.graph[*index]
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn ordered_indices(&self) -> Vec<NodeIndex> {
        toposort(&self.graph, None).unwrap_or_else(|_| self.graph.node_indices().collect())
    }
}

/// 渲染拓扑图到一个保留的临时文件，返回文件路径
pub fn render() -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("quartet-topology-")
        .suffix(".svg")
        .tempfile()?;
    file.write_all(Topology::new().to_svg().as_bytes())?;

    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// 渲染拓扑图到指定路径
pub fn render_to(path: &Path) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Topology::new().to_svg())?;
    Ok(path.to_path_buf())
}
