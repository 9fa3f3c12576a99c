//! Task step extraction: the first ordered list in a task's context
//! becomes the step sequence.

use crate::dom::NodeId;
use crate::log::RunLog;
use crate::refs::{self, Forwards};

use super::Topic;

/// Move the first top-level ordered list out of the context into the
/// placeholder `steps` element. Each list item becomes a step whose
/// leading text is the command and whose remaining content is info.
/// Content after the list trails into the last step's info.
pub fn extract(topic: &mut Topic, log: &mut RunLog) {
    let dom = &mut topic.dom;
    let mut scratch = Forwards::new();

    let context = topic.body;
    let Some(&steps) = dom.collect_tags(topic.root, "steps").first() else {
        return;
    };
    let placeholder = dom.first_child(steps);

    let mut started = false;
    let mut last_step = NodeId::NONE;
    let mut last_info = NodeId::NONE;

    for child in dom.child_ids(context) {
        if !started && dom.is_tag(child, "ol") {
            started = true;
            for li in dom.child_ids(child) {
                if !dom.is_tag(li, "li") || !dom.has_children(li) {
                    continue;
                }
                let step = dom.create_element("step");
                dom.insert_before(placeholder, step);
                refs::move_id(dom, &mut scratch, li, step);

                let cmd = dom.create_element("cmd");
                dom.append(step, cmd);
                let first = dom.first_child(li);
                if let Some(text) = dom.text(first) {
                    let trimmed = text.trim_end_matches(' ').to_string();
                    dom.set_text(first, trimmed);
                    dom.append(cmd, first);
                }

                if dom.has_children(li) {
                    let info = dom.create_element("info");
                    dom.append(step, info);
                    dom.move_children(li, info, None);
                    last_info = info;
                } else {
                    last_info = NodeId::NONE;
                }
                last_step = step;
            }
            refs::destroy_node(dom, &mut scratch, log, child);
        } else if started {
            // Everything after the step list belongs to the last step.
            if last_step.is_none() {
                continue;
            }
            if last_info.is_none() {
                last_info = dom.create_element("info");
                dom.append(last_step, last_info);
            }
            dom.append(last_info, child);
        }
    }

    if started {
        refs::destroy_node(dom, &mut scratch, log, placeholder);
    }
}
