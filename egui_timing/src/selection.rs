//! 选择与键盘模块
//!
//! 单选模型：任意时刻最多选中一个区间。以及编辑器获得焦点时的快捷键映射。

use crate::structure::Timing;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<usize>,
}

impl Selection {
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected == Some(index)
    }

    /// 选中 `index`，返回选择是否发生了变化
    pub fn select(&mut self, index: usize) -> bool {
        let changed = self.selected != Some(index);
        self.selected = Some(index);
        changed
    }

    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// 区间列表被整体替换：旧下标不再可信，必须清除
    pub fn on_replaced(&mut self) -> bool {
        self.clear()
    }

    /// 新建区间后列表重新排序，让选择继续指向同一个区间
    pub fn remap(&mut self, before: &[Timing], after: &[Timing]) -> bool {
        let Some(index) = self.selected else {
            return false;
        };
        let Some(timing) = before.get(index) else {
            return self.clear();
        };
        match after.iter().position(|t| t == timing) {
            Some(next) => {
                self.selected = Some(next);
                next != index
            }
            None => self.clear(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Space,
    Escape,
}

/// 按键发生时的焦点状态
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub editor_focused: bool,
    /// 焦点在文本输入控件内（此时空格属于输入）
    pub text_input_focused: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    TogglePlayback,
    ClearSelection,
    None,
}

pub fn key_action(key: EditorKey, context: KeyContext, space_playback: bool) -> KeyAction {
    if !context.editor_focused {
        return KeyAction::None;
    }
    match key {
        EditorKey::Space if space_playback && !context.text_input_focused => {
            KeyAction::TogglePlayback
        }
        EditorKey::Escape => KeyAction::ClearSelection,
        _ => KeyAction::None,
    }
}
