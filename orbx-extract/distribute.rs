use orbx_core::Keypoint;
use std::mem;

/// Quad-tree node over a rectangular region of the usable sub-rectangle.
/// Nodes live in a flat working vector for the duration of one
/// distribution call; nothing references them afterwards.
#[derive(Debug, Default)]
struct QuadNode {
    ul: (i32, i32),
    br: (i32, i32),
    points: Vec<Keypoint>,
    /// Holds exactly one candidate; never subdivided again.
    terminal: bool,
}

impl QuadNode {
    fn new(ul: (i32, i32), br: (i32, i32)) -> Self {
        Self {
            ul,
            br,
            points: Vec::new(),
            terminal: false,
        }
    }

    /// Split into four quadrants along midlines rounded up. A point exactly
    /// on a midline fails the `<` test and falls to the right/bottom child.
    fn split(self) -> [QuadNode; 4] {
        let half_x = ((self.br.0 - self.ul.0) as f32 / 2.0).ceil() as i32;
        let half_y = ((self.br.1 - self.ul.1) as f32 / 2.0).ceil() as i32;
        let mid_x = self.ul.0 + half_x;
        let mid_y = self.ul.1 + half_y;

        let mut children = [
            QuadNode::new(self.ul, (mid_x, mid_y)),
            QuadNode::new((mid_x, self.ul.1), (self.br.0, mid_y)),
            QuadNode::new((self.ul.0, mid_y), (mid_x, self.br.1)),
            QuadNode::new((mid_x, mid_y), self.br),
        ];

        for kp in self.points {
            let right = !(kp.x < mid_x as f32);
            let bottom = !(kp.y < mid_y as f32);
            let idx = (right as usize) + 2 * (bottom as usize);
            children[idx].points.push(kp);
        }
        for child in &mut children {
            if child.points.len() == 1 {
                child.terminal = true;
            }
        }
        children
    }
}

/// Quad-tree spatial redistribution: grows a leaf set over the candidate
/// cloud until the leaf count reaches `target` (or no leaf can split), then
/// retains the highest-response candidate per leaf. The result is an
/// upper-bounded, spatially decorrelated subset; no post-hoc truncation is
/// applied, so the count may land slightly above or below `target`.
pub fn distribute_quadtree(
    candidates: Vec<Keypoint>,
    width: i32,
    height: i32,
    target: usize,
) -> Vec<Keypoint> {
    if candidates.is_empty() || width <= 0 || height <= 0 {
        return Vec::new();
    }

    // enough initial columns to keep the first row of nodes roughly square
    let n_init = ((width as f32 / height as f32).round() as i32).max(1);
    let col_width = width as f32 / n_init as f32;

    let mut nodes: Vec<QuadNode> = (0..n_init)
        .map(|i| {
            QuadNode::new(
                ((col_width * i as f32) as i32, 0),
                ((col_width * (i + 1) as f32) as i32, height),
            )
        })
        .collect();

    for kp in candidates {
        let col = ((kp.x / col_width) as usize).min(nodes.len() - 1);
        nodes[col].points.push(kp);
    }
    nodes.retain(|n| !n.points.is_empty());
    for node in &mut nodes {
        if node.points.len() == 1 {
            node.terminal = true;
        }
    }

    loop {
        let prev_count = nodes.len();
        let mut next = Vec::with_capacity(nodes.len() * 4);
        let mut expandable = 0usize;
        for node in nodes {
            if node.terminal {
                next.push(node);
                continue;
            }
            for child in node.split() {
                if child.points.is_empty() {
                    continue;
                }
                if child.points.len() > 1 {
                    expandable += 1;
                }
                next.push(child);
            }
        }
        nodes = next;

        if nodes.len() >= target || nodes.len() == prev_count {
            break;
        }
        // another full pass would overshoot; finish one split at a time
        if nodes.len() + expandable * 3 > target {
            finish_by_density(&mut nodes, target);
            break;
        }
    }

    nodes
        .iter()
        .map(|node| {
            let mut best = &node.points[0];
            for p in &node.points[1..] {
                if p.response > best.response {
                    best = p;
                }
            }
            *best
        })
        .collect()
}

/// Final growth passes: split the most populous nodes first, re-checking
/// the node count after every single split and stopping the moment it
/// reaches `target`. Children minted during a pass only become split
/// candidates in the next pass.
fn finish_by_density(nodes: &mut Vec<QuadNode>, target: usize) {
    loop {
        let prev_count = nodes.len();

        let mut order: Vec<(usize, usize)> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.terminal)
            .map(|(slot, n)| (n.points.len(), slot))
            .collect();
        order.sort_unstable();

        for &(_, slot) in order.iter().rev() {
            let parent = mem::take(&mut nodes[slot]);
            let mut children = parent
                .split()
                .into_iter()
                .filter(|c| !c.points.is_empty());
            // a splittable node holds >= 2 points, so a child survives
            nodes[slot] = children.next().unwrap();
            nodes.extend(children);

            if nodes.len() >= target {
                return;
            }
        }

        if nodes.len() >= target || nodes.len() == prev_count {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(x: f32, y: f32, response: f32) -> Keypoint {
        Keypoint {
            x,
            y,
            response,
            ..Keypoint::default()
        }
    }

    fn positions(kps: &[Keypoint]) -> Vec<(u32, u32)> {
        kps.iter().map(|k| (k.x as u32, k.y as u32)).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(distribute_quadtree(Vec::new(), 100, 100, 10).is_empty());
    }

    #[test]
    fn degenerate_rectangle_yields_empty_output() {
        let pts = vec![point(1.0, 1.0, 1.0)];
        assert!(distribute_quadtree(pts, 0, 100, 10).is_empty());
    }

    #[test]
    fn small_distinct_set_is_retained_unchanged() {
        let pts = vec![
            point(5.0, 5.0, 1.0),
            point(50.0, 12.0, 2.0),
            point(90.0, 80.0, 3.0),
            point(20.0, 60.0, 4.0),
        ];
        let mut result = distribute_quadtree(pts.clone(), 100, 100, 10);
        result.sort_by(|a, b| a.response.partial_cmp(&b.response).unwrap());
        assert_eq!(result.len(), pts.len());
        for (got, want) in result.iter().zip(&pts) {
            assert_eq!((got.x, got.y, got.response), (want.x, want.y, want.response));
        }
    }

    #[test]
    fn retains_best_response_per_region() {
        // a tight cluster that can never be split apart plus one loner
        let pts = vec![
            point(10.0, 10.0, 1.0),
            point(10.0, 10.0, 9.0),
            point(10.0, 10.0, 4.0),
            point(80.0, 80.0, 2.0),
        ];
        let result = distribute_quadtree(pts, 100, 100, 10);
        assert_eq!(result.len(), 2);
        let cluster_winner = result
            .iter()
            .find(|k| k.x == 10.0)
            .expect("cluster representative missing");
        assert_eq!(cluster_winner.response, 9.0);
    }

    #[test]
    fn first_encountered_wins_response_ties() {
        let pts = vec![
            point(10.0, 10.0, 5.0),
            point(10.0, 10.0, 5.0),
            point(10.0, 10.0, 5.0),
        ];
        let result = distribute_quadtree(pts, 100, 100, 4);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].response, 5.0);
    }

    #[test]
    fn dense_grid_is_cut_down_to_roughly_the_target() {
        let mut pts = Vec::new();
        for gy in 0..10 {
            for gx in 0..10 {
                pts.push(point(
                    5.0 + gx as f32 * 10.0,
                    5.0 + gy as f32 * 10.0,
                    (gy * 10 + gx) as f32,
                ));
            }
        }
        let result = distribute_quadtree(pts, 100, 100, 25);
        assert!(result.len() >= 25, "undershot: {}", result.len());
        assert!(result.len() <= 27, "overshot: {}", result.len());
    }

    #[test]
    fn output_positions_are_unique() {
        let mut pts = Vec::new();
        for i in 0..200u32 {
            let x = (i.wrapping_mul(37) % 120) as f32;
            let y = (i.wrapping_mul(91) % 90) as f32;
            pts.push(point(x, y, i as f32));
        }
        let result = distribute_quadtree(pts, 120, 90, 40);
        let mut seen = positions(&result);
        seen.sort_unstable();
        let before = seen.len();
        seen.dedup();
        assert_eq!(before, seen.len(), "two keypoints from one leaf");
    }

    #[test]
    fn wide_rectangle_uses_multiple_initial_columns() {
        // width/height rounds to 4 initial columns; one candidate each
        let pts = vec![
            point(10.0, 5.0, 1.0),
            point(110.0, 5.0, 2.0),
            point(210.0, 5.0, 3.0),
            point(390.0, 5.0, 4.0),
        ];
        let result = distribute_quadtree(pts, 400, 100, 2);
        // all candidates sit in distinct initial nodes, already terminal
        assert_eq!(result.len(), 4);
    }

    proptest! {
        #[test]
        fn output_is_a_subset_with_unique_positions(
            raw in prop::collection::vec((0u32..150, 0u32..110, 0u32..1000), 1..300),
            target in 1usize..80,
        ) {
            let pts: Vec<Keypoint> = raw
                .iter()
                .map(|&(x, y, r)| point(x as f32, y as f32, r as f32))
                .collect();
            let input_positions = positions(&pts);
            let result = distribute_quadtree(pts, 150, 110, target);

            prop_assert!(!result.is_empty());
            prop_assert!(result.len() <= input_positions.len());

            // every survivor came from the input
            for kp in &result {
                prop_assert!(input_positions.contains(&(kp.x as u32, kp.y as u32)));
            }

            // at most one survivor per leaf means unique positions
            let mut seen = positions(&result);
            seen.sort_unstable();
            let before = seen.len();
            seen.dedup();
            prop_assert_eq!(before, seen.len());
        }
    }
}
