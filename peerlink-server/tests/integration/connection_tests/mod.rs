mod test_rejoin_last_write_wins;
