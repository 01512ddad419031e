mod test_hang_up_terminates;
mod test_incoming_call_is_answered;
mod test_media_failure_returns_to_idle;
mod test_unexpected_answer_ignored;
