//! Arena of blocks rooted at the input mesh

use crate::block::{BlockId, BlockKind, BlockOutput, EffectParameter};
use crate::effect::Effect;
use crate::input::Input;
use std::collections::HashMap;
use std::sync::Arc;
use tetraviz_algorithms::OctreeConfig;
use tetraviz_core::{Error, Result, Vector3f, VolumeMesh};
use tracing::{debug, instrument};

/// A node of the tree
#[derive(Debug)]
pub struct Block {
    effect: Effect,
    parent: Option<BlockId>,
    children: Vec<BlockId>,
    visible: bool,
    output: Arc<BlockOutput>,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.effect.kind()
    }

    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn children(&self) -> &[BlockId] {
        &self.children
    }

    /// Whether a renderer should draw this block. A block is hidden while it
    /// has children.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn output(&self) -> &BlockOutput {
        &self.output
    }

    /// Unit normal and position of a slice or clip plane
    pub fn plane(&self) -> Option<(Vector3f, f32)> {
        self.effect.plane()
    }

    /// Positions along the plane normal that cross the parent geometry
    pub fn position_range(&self) -> Option<(f32, f32)> {
        self.effect.position_range()
    }

    pub fn iso_value(&self) -> Option<f32> {
        self.effect.iso_value()
    }

    pub fn threshold_bounds(&self) -> Option<(f32, f32)> {
        self.effect.threshold_bounds()
    }

    pub fn warp_factor(&self) -> Option<f32> {
        self.effect.warp_factor()
    }

    pub fn input(&self) -> Option<&Input> {
        self.effect.input()
    }
}

/// Blocks stored in an arena, addressed by [`BlockId`].
///
/// Removed blocks leave a hole, ids are never reused.
#[derive(Debug)]
pub struct BlockTree {
    blocks: Vec<Option<Block>>,
    config: OctreeConfig,
}

impl BlockTree {
    /// Create a tree whose root is a data block holding `mesh`
    pub fn new(mesh: VolumeMesh) -> Self {
        Self::with_config(mesh, OctreeConfig::default())
    }

    /// Create a tree whose slicing blocks build octrees with `config`
    pub fn with_config(mesh: VolumeMesh, config: OctreeConfig) -> Self {
        let root = Block {
            effect: Effect::Data,
            parent: None,
            children: Vec::new(),
            visible: true,
            output: Arc::new(BlockOutput::data(Arc::new(mesh))),
        };
        Self {
            blocks: vec![Some(root)],
            config,
        }
    }

    pub fn root(&self) -> BlockId {
        BlockId(0)
    }

    /// Number of blocks in the tree, root included
    pub fn len(&self) -> usize {
        self.blocks.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: BlockId) -> Result<&Block> {
        self.blocks
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(Error::UnknownBlock(id.0))
    }

    fn get_mut(&mut self, id: BlockId) -> Result<&mut Block> {
        self.blocks
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownBlock(id.0))
    }

    pub fn children(&self, id: BlockId) -> Result<&[BlockId]> {
        Ok(self.get(id)?.children())
    }

    pub fn parent(&self, id: BlockId) -> Result<Option<BlockId>> {
        Ok(self.get(id)?.parent())
    }

    pub fn output(&self, id: BlockId) -> Result<&BlockOutput> {
        Ok(self.get(id)?.output())
    }

    /// `id` followed by all its descendants, depth first
    pub fn descendants(&self, id: BlockId) -> Result<Vec<BlockId>> {
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            stack.extend(self.get(current)?.children.iter().rev());
        }
        Ok(ids)
    }

    /// Add a block of `kind` under `parent`.
    ///
    /// The block is validated against the parent output and computed before
    /// it is inserted, so on error the tree is left as it was. On success the
    /// parent is hidden.
    #[instrument(skip(self))]
    pub fn add_block(&mut self, parent: BlockId, kind: BlockKind) -> Result<BlockId> {
        let parent_output = Arc::clone(&self.get(parent)?.output);
        kind.validate(&parent_output.mesh, parent_output.deformed)?;

        let mut effect = Effect::new(kind);
        effect.bind(&parent_output, &self.config)?;
        let output = effect.output(&parent_output)?;

        let id = BlockId(self.blocks.len());
        self.blocks.push(Some(Block {
            effect,
            parent: Some(parent),
            children: Vec::new(),
            visible: true,
            output: Arc::new(output),
        }));

        let parent_block = self.get_mut(parent)?;
        parent_block.children.push(id);
        parent_block.visible = false;

        debug!("Added {} block {} under {}", kind, id, parent);
        Ok(id)
    }

    /// Change a parameter of a block, then recompute the block and every
    /// block below it.
    ///
    /// The new states are computed on copies and stored only once all of
    /// them succeed. On error the tree is left as it was.
    #[instrument(skip(self))]
    pub fn apply(&mut self, id: BlockId, parameter: EffectParameter) -> Result<()> {
        if let EffectParameter::Visible(visible) = parameter {
            self.get_mut(id)?.visible = visible;
            return Ok(());
        }

        let block = self.get(id)?;
        let parent = match block.parent {
            Some(parent) => parent,
            None => return Err(parameter.unsupported(block.kind())),
        };
        let parent_output = Arc::clone(&self.get(parent)?.output);

        let mut effect = block.effect.clone();
        effect.set(parameter, &parent_output)?;
        let output = Arc::new(effect.output(&parent_output)?);

        let mut staged = vec![(id, effect, output)];
        self.stage_children(id, &mut staged)?;

        let refreshed = staged.len() - 1;
        for (block_id, effect, output) in staged {
            let block = self.get_mut(block_id)?;
            block.effect = effect;
            block.output = output;
        }

        if refreshed > 0 {
            debug!("Refreshed {} blocks below {}", refreshed, id);
        }
        Ok(())
    }

    /// Rebuild every descendant of `id` from the staged output of `id`,
    /// appending the new states to `staged`
    fn stage_children(&self, id: BlockId, staged: &mut Vec<(BlockId, Effect, Arc<BlockOutput>)>) -> Result<()> {
        let mut outputs: HashMap<BlockId, Arc<BlockOutput>> =
            staged.iter().map(|(block, _, output)| (*block, Arc::clone(output))).collect();

        for child in self.descendants(id)?.into_iter().skip(1) {
            let block = self.get(child)?;
            let parent = block.parent.ok_or(Error::UnknownBlock(child.0))?;
            let parent_output = outputs.get(&parent).ok_or(Error::UnknownBlock(parent.0))?;

            let mut effect = block.effect.clone();
            effect.bind(parent_output, &self.config)?;
            let output = Arc::new(effect.output(parent_output)?);

            outputs.insert(child, Arc::clone(&output));
            staged.push((child, effect, output));
        }
        Ok(())
    }

    /// Remove a block and everything below it. The parent is shown again.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: BlockId) -> Result<()> {
        let parent = self
            .get(id)?
            .parent
            .ok_or_else(|| Error::Unsupported("the data block cannot be removed".to_string()))?;

        let removed = self.descendants(id)?;
        for block in &removed {
            self.blocks[block.0] = None;
        }

        let parent_block = self.get_mut(parent)?;
        parent_block.children.retain(|&child| child != id);
        parent_block.visible = true;

        debug!("Removed {} blocks under {}", removed.len(), parent);
        Ok(())
    }
}
