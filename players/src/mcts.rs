use std::collections::VecDeque;

use log::*;
use once_cell::sync::OnceCell;
use rand::Rng;
use rand_mt::Mt64;

use engine::{
    Action,
    Game,
    GameError,
    PlayerId,
};

use super::{
    generator::{
        random_playout,
        ActionGenerator,
        LegalAction,
    },
    Player,
    TreeStats,
};

type NodeId = usize;

const ROOT: NodeId = 0;

/// One entry of the search tree. Nodes live in the tree's arena and
/// refer to each other by index, so rerooting never chases owning
/// pointers.
#[derive(Debug)]
struct Node {
    action: Action,
    terminal: bool,
    expandable: bool,
    visits: u32,
    wins: f64,
    losses: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    legal_actions: OnceCell<Vec<LegalAction>>,
}

impl Node {
    fn new(action: Action, terminal: bool, parent: Option<NodeId>) -> Node {
        Node {
            action,
            terminal,
            expandable: !terminal,
            visits: 0,
            wins: 0.0,
            losses: 0.0,
            parent,
            children: Vec::new(),
            legal_actions: OnceCell::new(),
        }
    }

    fn score(&self) -> f64 {
        let total = self.wins + self.losses;
        if total > 0.0 {
            self.wins / total
        } else {
            0.0
        }
    }
}

/// Monte Carlo tree search over full game states. The searching player
/// is fixed when the tree is created; the internal game always holds the
/// state *before* the root's action, so replaying the path from the root
/// reconstructs any node's state.
pub struct GameTree {
    nodes: Vec<Node>,
    game: Game,
    searcher: PlayerId,
    rng: Mt64,
}

impl GameTree {
    pub fn new(game: &Game, searcher: PlayerId, seed: u64) -> GameTree {
        GameTree {
            nodes: vec![Node::new(Action::Initial, false, None)],
            game: game.copy(),
            searcher,
            rng: Mt64::new(seed),
        }
    }

    /// Runs `iterations` rounds of select/expand/rollout/backup and
    /// returns the most promising root move, if any.
    pub fn run(&mut self, iterations: usize) -> Option<Action> {
        for _ in 0..iterations {
            self.iterate();
        }
        self.best_action()
    }

    /// The root child with the most accumulated wins; earlier children
    /// win ties.
    pub fn best_action(&self) -> Option<Action> {
        let mut best: Option<NodeId> = None;
        for &child in &self.nodes[ROOT].children {
            match best {
                None => best = Some(child),
                Some(current) if self.nodes[child].wins > self.nodes[current].wins => {
                    best = Some(child)
                }
                Some(_) => (),
            }
        }
        best.map(|id| self.nodes[id].action.clone())
    }

    /// Commits a move: the matching root child becomes the new root and
    /// everything else is released. A move the tree never expanded
    /// restarts it from a fresh root.
    pub fn play(&mut self, action: &Action) {
        let root_action = self.nodes[ROOT].action.clone();
        if let Err(e) = root_action.apply(&mut self.game) {
            debug!("Committing the root action ended the game: {}", e);
        }
        let chosen = self.nodes[ROOT]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].action == *action);
        match chosen {
            Some(child) => self.reroot(child),
            None => {
                // The new root is a plain start node; starting twice is
                // harmless, so replays stay correct.
                if let Err(e) = action.apply(&mut self.game) {
                    debug!("Committing {} ended the game: {}", action, e);
                }
                self.nodes = vec![Node::new(Action::Initial, false, None)];
            }
        }
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            height: self.height(),
            nodes: self.node_count(),
            exploration: self.exploration_rate(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn height(&self) -> usize {
        self.depth(ROOT)
    }

    /// Share of nodes whose legal actions are not exhausted yet; 1.0
    /// means the whole tree is frontier.
    pub fn exploration_rate(&self) -> f64 {
        let expandable = self.nodes.iter().filter(|n| n.expandable).count();
        expandable as f64 / self.nodes.len() as f64
    }

    fn iterate(&mut self) {
        let leaf = self.tree_policy();
        let reward = self.default_policy(leaf);
        self.backup(leaf, reward);
    }

    /// Descends from the root: expands the first expandable node on the
    /// way, otherwise follows the UCT-best child.
    fn tree_policy(&mut self) -> NodeId {
        let mut node = ROOT;
        while !self.nodes[node].terminal {
            if self.nodes[node].expandable {
                return self.expand(node);
            }
            match self.select_child(node) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    /// Adds one child for a legal action not tried yet. When no new
    /// action remains the node stops being expandable.
    fn expand(&mut self, node: NodeId) -> NodeId {
        if self.nodes[node].legal_actions.get().is_none() {
            let (game, loser) = self.replay(node);
            if let Some(loser) = loser {
                debug!("Replay already terminal, {} lost", loser);
                self.nodes[node].terminal = true;
                self.nodes[node].expandable = false;
                return node;
            }
            let actions = ActionGenerator::new(&game, Some(self.searcher), &mut self.rng)
                .collect_actions(&mut self.rng);
            self.nodes[node]
                .legal_actions
                .set(actions)
                .expect("legal actions initialized twice");
        }

        let fresh: Option<LegalAction> = {
            let known = &self.nodes[node];
            known
                .legal_actions
                .get()
                .unwrap()
                .iter()
                .find(|legal| {
                    !known
                        .children
                        .iter()
                        .any(|&child| self.nodes[child].action == legal.action)
                })
                .cloned()
        };
        match fresh {
            Some(legal) => {
                let id = self.nodes.len();
                self.nodes
                    .push(Node::new(legal.action, legal.terminal, Some(node)));
                self.nodes[node].children.push(id);
                id
            }
            None => {
                self.nodes[node].expandable = false;
                node
            }
        }
    }

    /// Upper confidence bound, except that off-turn branches draw a
    /// small random negative score: they stay explorable without ever
    /// looking exploitable.
    fn select_child(&mut self, node: NodeId) -> Option<NodeId> {
        let parent_visits = self.nodes[node].visits.max(1);
        let mut best: Option<(NodeId, f64)> = None;
        for index in 0..self.nodes[node].children.len() {
            let child = self.nodes[node].children[index];
            let score = self.uct(parent_visits, child);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    fn uct(&mut self, parent_visits: u32, child: NodeId) -> f64 {
        let node = &self.nodes[child];
        let acting = node.action.get_player();
        if acting.is_some() && acting != Some(self.searcher) {
            return -self.rng.gen::<f64>();
        }
        const C: f64 = std::f64::consts::FRAC_1_SQRT_2;
        let visits = node.visits.max(1) as f64;
        node.score() + 2.0 * C * (2.0 * (parent_visits as f64).ln() / visits).sqrt()
    }

    /// Clones the internal game and applies the action path from the
    /// root down to `node`. Paths are deterministic, so a validated
    /// action never turns invalid here.
    fn replay(&self, node: NodeId) -> (Game, Option<PlayerId>) {
        let mut path = vec![node];
        let mut current = self.nodes[node].parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.nodes[parent].parent;
        }

        let mut game = self.game.copy();
        for &step in path.iter().rev() {
            match self.nodes[step].action.apply(&mut game) {
                Ok(()) => (),
                Err(GameError::DeadPlayer(loser)) => return (game, Some(loser)),
                Err(GameError::Invalid(e)) => {
                    debug_assert!(false, "invalid action during replay: {}", e);
                }
            }
        }
        (game, None)
    }

    /// Rollout: play random moves from the node's state until someone
    /// dies. The reward is +1 when the searcher survives, -1 otherwise.
    fn default_policy(&mut self, node: NodeId) -> f64 {
        let (mut game, mut loser) = self.replay(node);
        if loser.is_none() {
            loser = random_playout(&mut game, &mut self.rng);
        }
        match loser {
            Some(loser) if loser == self.searcher => -1.0,
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Walks the parent chain accumulating the reward. Passing through a
    /// hidden-hand hypothesis scales the reward by its chance, so
    /// uncertain futures only count in expectation.
    fn backup(&mut self, node: NodeId, reward: f64) {
        let mut reward = reward;
        let mut current = Some(node);
        while let Some(id) = current {
            if let Action::ProbablePlay { chance, .. } = self.nodes[id].action {
                reward *= chance;
            }
            let node = &mut self.nodes[id];
            node.visits += 1;
            if reward > 0.0 {
                node.wins += reward;
            } else {
                node.losses += -reward;
            }
            current = node.parent;
        }
    }

    /// Copies the chosen subtree into a fresh arena, dropping siblings
    /// and ancestors.
    fn reroot(&mut self, new_root: NodeId) {
        let mut fresh: Vec<Node> = Vec::new();
        let mut queue: VecDeque<(NodeId, Option<NodeId>)> = VecDeque::new();
        queue.push_back((new_root, None));
        while let Some((old, parent)) = queue.pop_front() {
            let id = fresh.len();
            let node = &self.nodes[old];
            fresh.push(Node {
                action: node.action.clone(),
                terminal: node.terminal,
                expandable: node.expandable,
                visits: node.visits,
                wins: node.wins,
                losses: node.losses,
                parent,
                children: Vec::new(),
                legal_actions: node.legal_actions.clone(),
            });
            if let Some(parent) = parent {
                fresh[parent].children.push(id);
            }
            for &child in &node.children {
                queue.push_back((child, Some(id)));
            }
        }
        debug!(
            "Rerooted: kept {} of {} nodes",
            fresh.len(),
            self.nodes.len()
        );
        self.nodes = fresh;
    }

    fn depth(&self, node: NodeId) -> usize {
        self.nodes[node]
            .children
            .iter()
            .map(|&child| 1 + self.depth(child))
            .max()
            .unwrap_or(0)
    }
}

/// A [`Player`] that plans every move with a fresh round of tree search.
pub struct MctsPlayer {
    name: String,
    iterations: usize,
    tree: Option<GameTree>,
    rng: Mt64,
}

impl MctsPlayer {
    pub fn new(name: String, seed: u64, iterations: usize) -> MctsPlayer {
        MctsPlayer {
            name,
            iterations,
            tree: None,
            rng: Mt64::new(seed),
        }
    }
}

impl Player for MctsPlayer {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn init_game(&mut self, player_id: PlayerId, game: &Game) {
        self.tree = Some(GameTree::new(game, player_id, self.rng.next_u64()));
    }

    fn get_action(&mut self, game: &Game) -> Option<Action> {
        let tree = self.tree.as_mut().unwrap();
        let action = tree.run(self.iterations);
        if action.is_none() {
            warn!("Search found no playable action");
            return ActionGenerator::new(game, None, &mut self.rng)
                .next_action(&mut self.rng)
                .map(|legal| legal.action);
        }
        action
    }

    fn notify_action(&mut self, action: &Action) {
        if let Some(tree) = self.tree.as_mut() {
            tree.play(action);
        }
    }

    fn stats(&self) -> Option<TreeStats> {
        self.tree.as_ref().map(|tree| tree.stats())
    }
}
