//! Overlay text and notices using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use firedrill_core::{InstructionLabel, Notification, Rgb};

use crate::DrillScene;

/// Who shows blocking notices raised by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Resource)]
pub enum NotificationMode {
    /// An egui window with an OK button
    #[default]
    Overlay,
    /// The host drains them from the context itself (browser `alert`)
    Host,
}

/// Notices waiting for the user to dismiss them
#[derive(Debug, Default, Resource)]
pub struct NoticeQueue(pub Vec<Notification>);

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NotificationMode>()
            .init_resource::<NoticeQueue>()
            .add_systems(Update, collect_notices)
            .add_systems(EguiPrimaryContextPass, (label_overlay, notice_window));
    }
}

pub fn color32(c: Rgb) -> egui::Color32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(channel(c[0]), channel(c[1]), channel(c[2]))
}

fn collect_notices(
    mode: Res<NotificationMode>,
    mut drill: ResMut<DrillScene>,
    mut queue: ResMut<NoticeQueue>,
) {
    if *mode != NotificationMode::Overlay || drill.ctx.pending_notifications().is_empty() {
        return;
    }
    queue.0.extend(drill.ctx.drain_notifications());
}

fn label_text(label: &InstructionLabel) -> egui::RichText {
    egui::RichText::new(&label.text)
        .size(label.font_size)
        .color(color32(label.color))
        .strong()
}

fn label_overlay(mut contexts: EguiContexts, drill: Res<DrillScene>) {
    let Some(label) = drill.ctx.label.as_ref() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Area::new(egui::Id::new("instruction_label"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, label.top_px))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(label_text(label));
        });
}

fn notice_window(mut contexts: EguiContexts, mut queue: ResMut<NoticeQueue>) {
    let Some(notice) = queue.0.first() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let mut dismissed = false;
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(&notice.message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        queue.0.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firedrill_core::feedback::{LabelConfig, GREEN, WHITE};

    #[test]
    fn test_color32() {
        assert_eq!(color32(WHITE), egui::Color32::WHITE);
        assert_eq!(color32(GREEN), egui::Color32::from_rgb(0, 128, 0));
        assert_eq!(color32([2.0, -1.0, 0.5]), egui::Color32::from_rgb(255, 0, 128));
    }

    #[test]
    fn test_label_text_follows_confirmation() {
        let mut label = InstructionLabel::new(&LabelConfig::default());
        let before = label_text(&label);
        assert_eq!(before.text(), label.text);
        label.confirm();
        let after = label_text(&label);
        assert_eq!(after.text(), "Good job! Fire extinguished.");
    }
}
