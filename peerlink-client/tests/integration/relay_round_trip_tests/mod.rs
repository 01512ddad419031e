mod test_two_coordinators_through_relay;
