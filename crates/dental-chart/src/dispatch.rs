use chart_types::{Chart, ToothNumber};
use tracing::debug;

use crate::error::SceneError;
use crate::messages::{draw_commands, HostToScene, SceneToHost};
use crate::scene::ArchScene;

/// Apply one host message to the scene. Failures come back as
/// `SceneToHost::Error` and leave the scene as it was.
pub fn dispatch(scene: &mut ArchScene, msg: HostToScene) -> SceneToHost {
    match handle_message(scene, msg) {
        Ok(response) => response,
        Err(e) => SceneToHost::Error {
            message: e.to_string(),
        },
    }
}

fn tooth(value: i64) -> Result<ToothNumber, SceneError> {
    Ok(ToothNumber::try_from(value)?)
}

fn selection_response(scene: &ArchScene) -> SceneToHost {
    let selected = scene.selected();
    SceneToHost::SelectionChanged {
        selected,
        state: selected.map(|t| scene.clinical_state(t).clone()),
    }
}

fn handle_message(scene: &mut ArchScene, msg: HostToScene) -> Result<SceneToHost, SceneError> {
    match msg {
        HostToScene::LoadChart { chart, selected } => {
            let selected = selected.map(tooth).transpose()?;
            scene.load_chart(Chart::from_values(chart), selected)?;
            Ok(SceneToHost::ChartLoaded {
                summary: scene.summary(),
                draw_list: draw_commands(&scene.draw_list()),
            })
        }

        HostToScene::PointerEnter { tooth: value } => {
            scene.pointer_enter(tooth(value)?);
            Ok(SceneToHost::HoverChanged {
                hovered: scene.hovered(),
            })
        }

        HostToScene::PointerLeave { tooth: value } => {
            scene.pointer_leave(tooth(value)?);
            Ok(SceneToHost::HoverChanged {
                hovered: scene.hovered(),
            })
        }

        HostToScene::Click { tooth: value } => {
            scene.click(tooth(value)?);
            Ok(selection_response(scene))
        }

        HostToScene::ClearSelection => {
            scene.clear_selection();
            Ok(selection_response(scene))
        }

        HostToScene::Advance { dt } => {
            scene.advance(dt);
            let animating = scene.stats().animating;
            debug!(dt, animating, "frame advanced");
            Ok(SceneToHost::FrameAdvanced {
                draw_list: draw_commands(&scene.draw_list()),
                animating,
            })
        }

        HostToScene::SetMeshDetail { detail } => {
            scene.set_mesh_detail(detail)?;
            Ok(SceneToHost::FrameAdvanced {
                draw_list: draw_commands(&scene.draw_list()),
                animating: scene.stats().animating,
            })
        }
    }
}
